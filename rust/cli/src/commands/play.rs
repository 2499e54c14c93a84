//! `pokerfelt play`: a live session against a table server.
//!
//! Lines typed on stdin become session operations; everything the server
//! pushes is drawn as it arrives. With a record path set, every inbound frame
//! is appended to a recording that `pokerfelt replay` can re-drive.

use super::drain_views;
use crate::config::{self, Config, FlagOverrides};
use crate::error::CliError;
use crate::formatters::{format_bet_slip, format_lobby, format_table};
use crate::recorder::FrameRecorder;
use crate::ui;
use pokerfelt_client::context::AppContext;
use pokerfelt_client::errors::SessionError;
use pokerfelt_client::events::Slice;
use pokerfelt_client::session::PokerSession;
use pokerfelt_client::transport::{SocketHandle, Transport, recv_event};
use pokerfelt_table::lobby::{BuyInPreset, CreateTableForm};
use pokerfelt_table::rules::{ActionKind, BetPreset, PlayerAction};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

const HELP: &str = "\
Commands:
  lobby                      join the lobby and list tables
  create [small_blind] [name]  create a table and join it at the minimum buy-in
  join <table> [min|mid|max|N] join a table from the lobby list
  leave                      leave the table
  start                      deal a hand
  fold | check | call | allin
  bet [N] | raise [N]        open the bet slip, or send N straight away
  amount N | preset min|half|pot|max
  confirm | cancel           send or close the bet slip
  say <text>                 chat at the table
  show                       redraw the table or lobby
  quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyIn {
    Preset(BuyInPreset),
    Amount(u32),
}

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayCommand {
    Help,
    Lobby,
    Create {
        small_blind: Option<u32>,
        name: Option<String>,
    },
    Join {
        table_id: String,
        buy_in: BuyIn,
    },
    Leave,
    Start,
    Act(ActionKind),
    Wager {
        kind: ActionKind,
        amount: Option<u32>,
    },
    Amount(u32),
    Preset(BetPreset),
    Confirm,
    Cancel,
    Chat(String),
    Show,
    Quit,
}

/// Parses one input line; `Ok(None)` for a blank line.
///
/// ```
/// use pokerfelt_cli::{parse_command, PlayCommand};
/// use pokerfelt_table::rules::ActionKind;
///
/// assert_eq!(
///     parse_command("raise 120").unwrap(),
///     Some(PlayCommand::Wager { kind: ActionKind::Raise, amount: Some(120) })
/// );
/// assert_eq!(parse_command("   ").unwrap(), None);
/// assert!(parse_command("shuffle").is_err());
/// ```
pub fn parse_command(line: &str) -> Result<Option<PlayCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => PlayCommand::Help,
        "lobby" | "tables" => PlayCommand::Lobby,
        "create" => {
            let (small_blind, name) = match rest.split_once(char::is_whitespace) {
                Some((first, tail)) => match first.parse::<u32>() {
                    Ok(sb) => (Some(sb), Some(tail.trim().to_string())),
                    Err(_) => (None, Some(rest.to_string())),
                },
                None if rest.is_empty() => (None, None),
                None => match rest.parse::<u32>() {
                    Ok(sb) => (Some(sb), None),
                    Err(_) => (None, Some(rest.to_string())),
                },
            };
            PlayCommand::Create { small_blind, name }
        }
        "join" => {
            let mut parts = rest.split_whitespace();
            let table_id = parts
                .next()
                .ok_or("join needs a table id")?
                .to_string();
            let buy_in = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("min") => BuyIn::Preset(BuyInPreset::Min),
                Some("mid") => BuyIn::Preset(BuyInPreset::Mid),
                Some("max") => BuyIn::Preset(BuyInPreset::Max),
                Some(n) => BuyIn::Amount(parse_amount(n)?),
            };
            PlayCommand::Join { table_id, buy_in }
        }
        "leave" => PlayCommand::Leave,
        "start" | "deal" => PlayCommand::Start,
        "fold" => PlayCommand::Act(ActionKind::Fold),
        "check" => PlayCommand::Act(ActionKind::Check),
        "call" => PlayCommand::Act(ActionKind::Call),
        "allin" | "all-in" => PlayCommand::Act(ActionKind::AllIn),
        "bet" | "raise" => PlayCommand::Wager {
            kind: if word.eq_ignore_ascii_case("bet") {
                ActionKind::Bet
            } else {
                ActionKind::Raise
            },
            amount: if rest.is_empty() {
                None
            } else {
                Some(parse_amount(rest)?)
            },
        },
        "amount" => PlayCommand::Amount(parse_amount(rest)?),
        "preset" => PlayCommand::Preset(
            BetPreset::parse(rest).ok_or_else(|| format!("unknown preset `{}`", rest))?,
        ),
        "confirm" => PlayCommand::Confirm,
        "cancel" => PlayCommand::Cancel,
        "say" | "chat" => PlayCommand::Chat(rest.to_string()),
        "show" => PlayCommand::Show,
        "quit" | "exit" => PlayCommand::Quit,
        other => return Err(format!("unknown command `{}` (try `help`)", other)),
    };
    Ok(Some(cmd))
}

fn parse_amount(raw: &str) -> Result<u32, String> {
    raw.parse()
        .map_err(|_| format!("`{}` is not a chip amount", raw))
}

/// Runs one parsed command against the session.
pub fn apply_command<T: Transport>(
    session: &mut PokerSession<T>,
    cmd: PlayCommand,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match cmd {
        PlayCommand::Help => writeln!(out, "{}", HELP)?,
        PlayCommand::Lobby => {
            session.join_lobby()?;
            writeln!(out, "{}", format_lobby(&session.lobby_rows()))?;
        }
        PlayCommand::Create { small_blind, name } => {
            let mut form = CreateTableForm::default();
            if let Some(sb) = small_blind {
                form = form.with_small_blind(sb);
            }
            if let Some(name) = name {
                form.table_name = name;
            }
            session.create_table(&form)?;
            ui::display_info(
                out,
                &format!("creating table; will join with {} chips", form.min_buy_in),
            )?;
        }
        PlayCommand::Join { table_id, buy_in } => {
            let amount = match buy_in {
                BuyIn::Amount(n) => n,
                BuyIn::Preset(preset) => {
                    let table = session
                        .lobby()
                        .iter()
                        .find(|t| t.table_id == table_id)
                        .ok_or_else(|| SessionError::UnknownTable(table_id.clone()))?;
                    preset.amount(table)
                }
            };
            session.confirm_join(&table_id, amount)?;
            ui::display_info(out, &format!("joining {} with {} chips", table_id, amount))?;
        }
        PlayCommand::Leave => session.leave_table()?,
        PlayCommand::Start => session.start_hand()?,
        PlayCommand::Act(kind) => session.act(PlayerAction::simple(kind))?,
        PlayCommand::Wager { kind, amount } => {
            session.open_bet_slip(kind)?;
            match amount {
                Some(n) => {
                    session.set_bet_amount(n)?;
                    let sent = session.confirm_bet()?;
                    ui::display_info(out, &format!("{} {}", sent.action.as_str(), sent.amount))?;
                }
                None => write_slip(session, out)?,
            }
        }
        PlayCommand::Amount(n) => {
            session.set_bet_amount(n)?;
            write_slip(session, out)?;
        }
        PlayCommand::Preset(preset) => {
            session.apply_preset(preset)?;
            write_slip(session, out)?;
        }
        PlayCommand::Confirm => {
            let sent = session.confirm_bet()?;
            ui::display_info(out, &format!("{} {}", sent.action.as_str(), sent.amount))?;
        }
        PlayCommand::Cancel => session.cancel_bet(),
        PlayCommand::Chat(text) => session.send_chat(&text)?,
        PlayCommand::Show => match session.view() {
            Some(view) => writeln!(out, "{}", format_table(view))?,
            None => writeln!(out, "{}", format_lobby(&session.lobby_rows()))?,
        },
        PlayCommand::Quit => {}
    }
    Ok(())
}

fn write_slip<T: Transport>(
    session: &PokerSession<T>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(slip) = session.bet_slip() {
        writeln!(out, "{}", format_bet_slip(slip))?;
    }
    Ok(())
}

pub fn handle_play_command(
    flags: FlagOverrides,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved =
        config::load_with_overrides(&flags).map_err(|e| CliError::Config(e.to_string()))?;
    let ctx = AppContext::new(resolved.config.client_settings())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(play_session(
        &ctx,
        &resolved.config,
        BufReader::new(tokio::io::stdin()),
        out,
        err,
    ));
    ctx.teardown();
    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_background();
    result
}

/// Drives one session until the input ends, `quit` is typed, or Ctrl+C.
pub async fn play_session<R>(
    ctx: &AppContext,
    config: &Config,
    input: R,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
{
    // Subscribe before the link starts so the server's first frame is seen.
    let socket: SocketHandle = ctx.socket()?;
    let mut inbound = socket.subscribe();
    let mut frames = socket.subscribe_frames();
    let mut recorder = match &config.record_path {
        Some(path) => {
            ui::display_info(out, &format!("recording to {}", path))?;
            Some(FrameRecorder::create(path).map_err(CliError::InvalidInput)?)
        }
        None => None,
    };
    let bus = ctx.bus();
    let mut views = [
        bus.subscribe(Slice::Lobby),
        bus.subscribe(Slice::Table),
        bus.subscribe(Slice::Chat),
        bus.subscribe(Slice::Notice),
    ];
    let mut session = PokerSession::new(socket.clone(), ctx);
    socket.start()?;
    let mut lines = input.lines();

    ui::display_info(
        out,
        &format!("connecting to {} (type `help`)", ctx.settings().server_url),
    )?;

    let outcome = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(PlayCommand::Quit)) => break Ok(()),
                    Ok(Some(cmd)) => {
                        if let Err(e) = apply_command(&mut session, cmd, out) {
                            ui::write_error(err, &e.to_string())?;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => ui::write_error(err, &msg)?,
                },
                Ok(None) => break Ok(()),
                Err(e) => break Err(e.into()),
            },
            event = recv_event(&mut inbound) => match event {
                Some(event) => session.handle(event),
                None => break Err(CliError::Client("connection closed".into())),
            },
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if let Some(rec) = recorder.as_mut() {
                        rec.record(&frame)?;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "recording fell behind; frames dropped");
                }
                Err(RecvError::Closed) => {
                    break Err(CliError::Client("connection closed".into()));
                }
            },
            _ = tokio::signal::ctrl_c() => {
                break Err(CliError::Interrupted("ctrl-c".into()));
            }
        }
        drain_views(&mut views, out)?;
    };

    session.destroy();
    drain_views(&mut views, out)?;
    if let Some(mut rec) = recorder {
        rec.flush()?;
        ui::display_info(out, &format!("recorded {} frames", rec.frames()))?;
    }
    outcome
}

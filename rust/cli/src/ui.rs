//! Prefixed status lines shared by the commands.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// Server-side alert pushed during a live session.
pub fn display_alert(out: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "!! {}", message)
}

pub fn display_info(out: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "-- {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes() {
        let mut buf = Vec::new();
        write_error(&mut buf, "boom").unwrap();
        display_warning(&mut buf, "careful").unwrap();
        display_alert(&mut buf, "Table is full").unwrap();
        display_info(&mut buf, "joined").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Error: boom\nWARNING: careful\n!! Table is full\n-- joined\n"
        );
    }
}

use itertools::Itertools;
use std::process::Command;

/// Renders a command as a copy-pasteable shell line, used in log output.
pub fn command_line(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| {
            let part = part.to_string_lossy();
            // only nul bytes are unquotable, show those escaped
            shlex::try_quote(&part).map(|quoted| quoted.into_owned()).unwrap_or_else(|_| {
                format!("{:?}", part)
            })
        })
        .join(" ")
}

pub fn format_bits(bits: &[u8]) -> String { bits.iter().map(|bit| bit.to_string()).join("") }

#[cfg(test)]
mod tests {
    use crate::util::formatting_helpers::{command_line, format_bits};
    use std::process::Command;

    #[test]
    fn test_command_line_quotes_arguments() {
        let mut command = Command::new("ffmpeg");
        command.args(["-i", "my video.mp4", "-f", "rawvideo"]);
        let line = command_line(&command);
        assert_eq!(
            shlex::split(&line).unwrap(),
            vec!["ffmpeg", "-i", "my video.mp4", "-f", "rawvideo"]
        );
    }

    #[test]
    fn test_format_bits() {
        assert_eq!(format_bits(&[1, 0, 1, 1, 0, 0, 0, 1]), "10110001");
    }

}

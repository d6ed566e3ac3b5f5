use crate::tracker::Platform;

pub const PLATFORM_TOKENS: &[(&str, Platform)] = &[
    ("XBOX", Platform::Xbl),
    ("PS4", Platform::Psn),
    ("PC", Platform::Pc),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(Platform),
    Usage(String),
}

pub fn parse_args<I, T>(args: I) -> CliCommand
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut args = args.into_iter();
    let Some(token) = args.next() else {
        return CliCommand::Usage(usage_text());
    };
    // Tokens are matched case-sensitively.
    match PLATFORM_TOKENS
        .iter()
        .find(|(candidate, _)| *candidate == token.as_ref())
    {
        Some((_, platform)) => CliCommand::Run(*platform),
        None => CliCommand::Usage(format!(
            "Unknown platform please use one of these: {}",
            token_list()
        )),
    }
}

pub fn usage_text() -> String {
    format!(
        " - Usage - \nstat2txt [platform]\nplatform = {}",
        token_list()
    )
}

fn token_list() -> String {
    PLATFORM_TOKENS
        .iter()
        .map(|(token, _)| *token)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{parse_args, usage_text, CliCommand};
    use crate::tracker::Platform;

    #[test]
    fn maps_each_platform_token() {
        assert_eq!(parse_args(["XBOX"]), CliCommand::Run(Platform::Xbl));
        assert_eq!(parse_args(["PS4"]), CliCommand::Run(Platform::Psn));
        assert_eq!(parse_args(["PC"]), CliCommand::Run(Platform::Pc));
    }

    #[test]
    fn no_arguments_prints_usage() {
        let empty: [&str; 0] = [];
        assert_eq!(parse_args(empty), CliCommand::Usage(usage_text()));
        assert!(usage_text().contains("platform = XBOX PS4 PC"));
    }

    #[test]
    fn rejects_unknown_and_lowercase_tokens() {
        for token in ["pc", "Xbox", "SWITCH", ""] {
            match parse_args([token]) {
                CliCommand::Usage(message) => {
                    assert!(message.starts_with("Unknown platform"), "{message}");
                    assert!(message.ends_with("XBOX PS4 PC"));
                }
                other => panic!("expected usage for {token:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn extra_arguments_are_ignored() {
        assert_eq!(
            parse_args(vec!["PC".to_owned(), "extra".to_owned()]),
            CliCommand::Run(Platform::Pc)
        );
    }
}

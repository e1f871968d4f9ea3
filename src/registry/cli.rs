//! Command-line binding for [`FlagSet`].
//!
//! Every flag becomes a `--name` argument. Flags given on the command line
//! are marked explicitly set, which gives them priority over config files.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::registry::{FlagKind, FlagRegistry, FlagSet, RejectedValue};

impl FlagSet {
    /// Build a clap command with one argument per registered flag.
    pub fn command(&self, name: &'static str) -> Command {
        let mut cmd = Command::new(name);
        for flag in self.list_all() {
            let arg = Arg::new(flag.name.clone())
                .long(flag.name.clone())
                .help(flag.usage);
            let arg = match self.kind(&flag.name) {
                Some(FlagKind::Bool) => arg.action(ArgAction::SetTrue),
                _ => arg
                    .action(ArgAction::Set)
                    .value_name("VALUE")
                    .allow_hyphen_values(true),
            };
            cmd = cmd.arg(arg);
        }
        cmd
    }

    /// Copy command-line values into the set, marking them explicit.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), RejectedValue> {
        let names: Vec<String> = self.names().map(str::to_string).collect();
        for name in names {
            if matches.value_source(&name) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = match self.kind(&name) {
                Some(FlagKind::Bool) => "true".to_string(),
                _ => match matches.get_one::<String>(&name) {
                    Some(v) => v.clone(),
                    None => continue,
                },
            };
            self.set_explicit(&name, &value).map_err(|e| {
                RejectedValue::new(format!("invalid value [{}] for flag -{}: {}", value, name, e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CONFIG_FLAG;

    fn flags() -> FlagSet {
        let mut set = FlagSet::with_reserved();
        set.int("port", 8080, "Listen port")
            .bool("verbose", false, "Verbose output")
            .string("name", "app", "Service name");
        set
    }

    #[test]
    fn test_command_line_values_are_explicit() {
        let mut set = flags();
        let matches = set
            .command("demo")
            .try_get_matches_from(["demo", "--port", "9000", "--verbose", "--config", "./app.ini"])
            .unwrap();
        set.apply_matches(&matches).unwrap();

        assert_eq!(set.get("port"), Some("9000"));
        assert_eq!(set.get("verbose"), Some("true"));
        assert_eq!(set.get(CONFIG_FLAG), Some("./app.ini"));

        let explicit = set.explicitly_set();
        assert!(explicit.contains("port"));
        assert!(explicit.contains("verbose"));
        assert!(!explicit.contains("name"));
    }

    #[test]
    fn test_invalid_command_line_value_is_rejected() {
        let mut set = flags();
        let matches = set
            .command("demo")
            .try_get_matches_from(["demo", "--port", "many"])
            .unwrap();
        let err = set.apply_matches(&matches).unwrap_err();
        assert!(err.reason.contains("-port"));
        assert_eq!(set.get("port"), Some("8080"));
    }
}

//! Command-line configuration.

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub num_aircraft: usize,
    pub num_sectors: usize,
}

impl Config {
    /// Parses the two positional arguments: `num_aircraft`, `num_sectors`.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ConfigurationError> {
        let args: Vec<String> = args.into_iter().collect();
        if args.len() < 2 {
            return Err(ConfigurationError::MissingArguments(args.len()));
        }

        let num_aircraft: i64 =
            args[0]
                .parse()
                .map_err(|source| ConfigurationError::InvalidInteger {
                    arg: args[0].clone(),
                    source,
                })?;
        let num_sectors: i64 =
            args[1]
                .parse()
                .map_err(|source| ConfigurationError::InvalidInteger {
                    arg: args[1].clone(),
                    source,
                })?;

        if num_aircraft <= 0 || num_sectors <= 0 {
            return Err(ConfigurationError::NonPositive {
                num_aircraft,
                num_sectors,
            });
        }

        Ok(Self {
            num_aircraft: num_aircraft as usize,
            num_sectors: num_sectors as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: &str, b: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string()]
    }

    #[test]
    fn parses_valid_positive_integers() {
        let config = Config::from_args(args("10", "5")).unwrap();
        assert_eq!(config.num_aircraft, 10);
        assert_eq!(config.num_sectors, 5);
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(matches!(
            Config::from_args(vec!["1".to_string()]),
            Err(ConfigurationError::MissingArguments(1))
        ));
    }

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(matches!(
            Config::from_args(args("0", "3")),
            Err(ConfigurationError::NonPositive { .. })
        ));
        assert!(matches!(
            Config::from_args(args("3", "-1")),
            Err(ConfigurationError::NonPositive { .. })
        ));
    }

    #[test]
    fn rejects_non_integer_arguments() {
        assert!(matches!(
            Config::from_args(args("x", "3")),
            Err(ConfigurationError::InvalidInteger { .. })
        ));
    }
}

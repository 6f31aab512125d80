use clap::{Parser, Subcommand};

use crate::error::ValidationError;

/// `steergen` - Generate and store AI-enhanced prompts and images.
#[derive(Parser, Debug)]
#[command(name = "steergen")]
#[command(version)]
#[command(about = "Generate and store AI-enhanced prompts and images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate images for a concept with varying feature strengths
    Generate {
        /// The concept to generate images for
        concept: String,

        /// The feature to apply to the concept
        feature: String,

        /// Number of strength variations to generate
        #[arg(short = 'n', long = "variations", default_value_t = 1)]
        variations: usize,

        /// Minimum feature strength
        #[arg(long, default_value_t = -0.5, allow_hyphen_values = true)]
        min_strength: f64,

        /// Maximum feature strength
        #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
        max_strength: f64,

        /// Index of the feature to use (0-4)
        #[arg(short = 'i', long, default_value_t = 0)]
        feature_index: u8,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List all discovered features for a given input
    ListFeatures {
        /// The feature input to look up
        feature_input: String,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Reject out-of-range sweep arguments before any external call is made.
pub fn validate_sweep(
    min_strength: f64,
    max_strength: f64,
    variations: usize,
) -> Result<(), ValidationError> {
    if !(-0.5..=0.5).contains(&min_strength)
        || !(-0.5..=0.5).contains(&max_strength)
        || min_strength > max_strength
    {
        return Err(ValidationError::StrengthRange {
            min: min_strength,
            max: max_strength,
        });
    }
    if variations < 1 {
        return Err(ValidationError::Variations);
    }
    Ok(())
}

pub fn validate_feature_index(feature_index: u8) -> Result<(), ValidationError> {
    if feature_index > 4 {
        return Err(ValidationError::FeatureIndex(feature_index));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_with_sweep_flags() {
        let cli = Cli::parse_from([
            "steergen",
            "generate",
            "a cat",
            "whiskers",
            "-n",
            "3",
            "--min-strength",
            "-0.5",
            "--max-strength",
            "0.5",
            "-i",
            "2",
            "-v",
        ]);

        match cli.command {
            Commands::Generate {
                concept,
                feature,
                variations,
                min_strength,
                max_strength,
                feature_index,
                verbose,
            } => {
                assert_eq!(concept, "a cat");
                assert_eq!(feature, "whiskers");
                assert_eq!(variations, 3);
                assert_eq!(min_strength, -0.5);
                assert_eq!(max_strength, 0.5);
                assert_eq!(feature_index, 2);
                assert!(verbose);
            }
            other => panic!("expected generate command, got {other:?}"),
        }
    }

    #[test]
    fn parse_generate_defaults() {
        let cli = Cli::parse_from(["steergen", "generate", "a cat", "whiskers"]);
        match cli.command {
            Commands::Generate {
                variations,
                min_strength,
                max_strength,
                feature_index,
                verbose,
                ..
            } => {
                assert_eq!(variations, 1);
                assert_eq!(min_strength, -0.5);
                assert_eq!(max_strength, 0.5);
                assert_eq!(feature_index, 0);
                assert!(!verbose);
            }
            other => panic!("expected generate command, got {other:?}"),
        }
    }

    #[test]
    fn parse_list_features() {
        let cli = Cli::parse_from(["steergen", "list-features", "whiskers"]);
        match cli.command {
            Commands::ListFeatures {
                feature_input,
                verbose,
            } => {
                assert_eq!(feature_input, "whiskers");
                assert!(!verbose);
            }
            other => panic!("expected list-features command, got {other:?}"),
        }
    }

    #[test]
    fn sweep_accepts_exact_bounds() {
        assert!(validate_sweep(-0.5, 0.5, 1).is_ok());
        assert!(validate_sweep(-0.5, -0.5, 1).is_ok());
        assert!(validate_sweep(0.5, 0.5, 10).is_ok());
    }

    #[test]
    fn sweep_rejects_out_of_range_strengths() {
        assert!(validate_sweep(-0.51, 0.5, 1).is_err());
        assert!(validate_sweep(-0.5, 0.51, 1).is_err());
    }

    #[test]
    fn sweep_rejects_inverted_range() {
        assert!(validate_sweep(0.3, -0.3, 1).is_err());
    }

    #[test]
    fn sweep_rejects_zero_variations() {
        assert!(validate_sweep(-0.5, 0.5, 0).is_err());
    }

    #[test]
    fn feature_index_boundaries() {
        assert!(validate_feature_index(0).is_ok());
        assert!(validate_feature_index(4).is_ok());
        assert!(validate_feature_index(5).is_err());
    }
}

use clap::Parser;
use forms::ValidationMode;

#[derive(Parser, Debug)]
#[command(name = "scribe", version, about = "Capture a user record in a validated terminal form")]
pub struct Cli {
    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", value_parser = parse_rate)]
    pub tick_rate: Option<f64>,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", value_parser = parse_rate)]
    pub frame_rate: Option<f64>,

    /// When fields are validated: onSubmit, onBlur, onChange, onTouched or all
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<ValidationMode>,

    /// Heading shown above the form
    #[arg(long)]
    pub title: Option<String>,
}

/// Rates become `1 / rate` second intervals, so they must be finite and positive.
fn parse_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|err| format!("{err}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("{raw} is not a positive number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "scribe", "-t", "8", "-f", "60", "-m", "onChange", "--title", "Signup",
        ]);
        assert_eq!(cli.tick_rate, Some(8.0));
        assert_eq!(cli.frame_rate, Some(60.0));
        assert_eq!(cli.mode, Some(ValidationMode::OnChange));
        assert_eq!(cli.title.as_deref(), Some("Signup"));
    }

    #[test]
    fn rejects_non_positive_rates() {
        for rate in ["0", "-4", "inf", "NaN", "fast"] {
            assert!(Cli::try_parse_from(["scribe", "--tick-rate", rate]).is_err(), "{rate}");
            assert!(Cli::try_parse_from(["scribe", "--frame-rate", rate]).is_err(), "{rate}");
        }
        let cli = Cli::parse_from(["scribe", "--tick-rate", "0.5"]);
        assert_eq!(cli.tick_rate, Some(0.5));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["scribe", "--mode", "sometimes"]).is_err());
    }
}

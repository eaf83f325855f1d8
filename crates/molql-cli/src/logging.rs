use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    registry::LookupSpan,
};

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn stderr_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
}

/// Plain-text events with thread ids and targets, for `--log-file`.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer());

    let installed = match log_file {
        Some(path) => {
            let file = File::create(&path).map_err(CliError::Io)?;
            subscriber.with(file_layer(file)).try_init()
        }
        None => subscriber.try_init(),
    };
    installed.map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;
    use std::sync::Once;
    use tracing::{debug, info, warn};

    static GLOBAL: Once = Once::new();

    fn install_global_once() {
        GLOBAL.call_once(|| {
            setup_logging(3, false, None).expect("global logger should install once");
        });
    }

    fn capture(path: &Path, verbosity: u8, emit: impl FnOnce()) -> String {
        let file = File::create(path).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(level_filter(verbosity, false))
            .with(file_layer(file));
        tracing::subscriber::with_default(subscriber, emit);
        std::fs::read_to_string(path).unwrap()
    }

    mod levels {
        use super::*;

        #[test]
        fn verbosity_count_raises_the_level() {
            assert_eq!(level_filter(0, false), LevelFilter::WARN);
            assert_eq!(level_filter(1, false), LevelFilter::INFO);
            assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
            assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        }

        #[test]
        fn quiet_wins_over_verbosity() {
            assert_eq!(level_filter(3, true), LevelFilter::OFF);
        }
    }

    mod file_output {
        use super::*;

        #[test]
        #[serial]
        fn default_level_keeps_only_warnings() {
            let dir = tempfile::tempdir().unwrap();
            let content = capture(&dir.path().join("run.log"), 0, || {
                debug!(units = 3, "Structure ready.");
                warn!("Query matched no elements.");
            });
            assert!(content.contains("Query matched no elements."));
            assert!(!content.contains("Structure ready."));
        }

        #[test]
        #[serial]
        fn entries_carry_target_fields_and_thread() {
            let dir = tempfile::tempdir().unwrap();
            let content = capture(&dir.path().join("run.log"), 2, || {
                info!(elements = 8, "Query replayed");
            });
            assert!(content.contains("INFO"));
            assert!(content.contains("elements=8"));
            assert!(content.contains("logging::tests"));
            assert!(content.contains("ThreadId"));
            assert!(!content.contains('\u{1b}'));
        }
    }

    mod installation {
        use super::*;

        #[test]
        #[serial]
        fn a_second_global_logger_is_refused() {
            install_global_once();
            let result = setup_logging(0, false, None);
            assert!(matches!(result, Err(CliError::Other(_))));
        }

        #[test]
        #[serial]
        fn unwritable_log_file_is_an_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let result = setup_logging(0, false, Some(dir.path().to_path_buf()));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}

use std::{
    env,
    fmt::{self as stdfmt, Write as _},
    io::{self, Write},
};

use nu_ansi_term::Color::{Blue, DarkGray, Magenta, Red, Yellow};
use tracing::{
    field::{Field, Visit},
    Event, Level, Metadata, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
    EnvFilter,
};

use crate::{cli::Args, utils::Colored};

/// Overrides the level flags with a full filter directive, e.g.
/// `PKGIDX_LOG=pkgidx_operations=trace`.
pub const LOG_ENV: &str = "PKGIDX_LOG";

/// Splits an event into its message and the remaining `key=value` fields.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: stdfmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}

/// Plain one-line output: a colored level tag for everything but INFO,
/// the message, then any structured fields dimmed.
pub struct LineFormatter;

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let mut line = LineVisitor::default();
        event.record(&mut line);

        let tag = match *event.metadata().level() {
            Level::TRACE => Some((Magenta, "[TRACE]")),
            Level::DEBUG => Some((Blue, "[DEBUG]")),
            Level::INFO => None,
            Level::WARN => Some((Yellow, "[WARN]")),
            Level::ERROR => Some((Red, "[ERROR]")),
        };
        if let Some((color, tag)) = tag {
            write!(writer, "{} ", Colored(color, tag))?;
        }

        writer.write_str(&line.message)?;
        if !line.fields.is_empty() {
            if !line.message.is_empty() {
                writer.write_char(' ')?;
            }
            write!(writer, "{}", Colored(DarkGray, &line.fields))?;
        }
        writeln!(writer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// INFO goes to stdout with the command's regular output; every other
    /// level is diagnostics.
    fn for_level(level: &Level) -> Self {
        if *level == Level::INFO {
            Stream::Stdout
        } else {
            Stream::Stderr
        }
    }
}

/// Collects one formatted event and prints it on drop with the progress
/// bars suspended, so bars never tear a log line.
struct LineWriter {
    buffer: Vec<u8>,
    stream: Stream,
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let text = String::from_utf8_lossy(&self.buffer);
        let text = text.trim_end_matches('\n');
        crate::progress::suspend(|| match self.stream {
            Stream::Stdout => println!("{text}"),
            Stream::Stderr => eprintln!("{text}"),
        });
    }
}

struct Streams;

impl<'a> MakeWriter<'a> for Streams {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            buffer: Vec::new(),
            stream: Stream::Stdout,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LineWriter {
            buffer: Vec::new(),
            stream: Stream::for_level(meta.level()),
        }
    }
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// The `pkgidx` directive covers the binary and every `pkgidx_*` crate,
/// since targets match by prefix.
fn build_filter(args: &Args, override_directive: Option<&str>) -> EnvFilter {
    let fallback = || EnvFilter::new(format!("pkgidx={}", filter_level(args)));
    match override_directive {
        Some(directive) if !directive.trim().is_empty() => {
            EnvFilter::try_new(directive).unwrap_or_else(|err| {
                eprintln!("ignoring invalid {LOG_ENV}: {err}");
                fallback()
            })
        }
        _ => fallback(),
    }
}

pub fn setup_logging(args: &Args) {
    let directive = env::var(LOG_ENV).ok();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(build_filter(args, directive.as_deref()))
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(Streams)
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(LineFormatter).finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(argv)
    }

    #[test]
    fn test_filter_level() {
        assert_eq!(filter_level(&parse(&["pkgidx", "config"])), Level::INFO);
        assert_eq!(filter_level(&parse(&["pkgidx", "-v", "config"])), Level::DEBUG);
        assert_eq!(filter_level(&parse(&["pkgidx", "-vv", "config"])), Level::TRACE);
        assert_eq!(filter_level(&parse(&["pkgidx", "-q", "config"])), Level::ERROR);
    }

    #[test]
    fn test_build_filter_override() {
        use tracing_subscriber::filter::LevelFilter;

        let args = parse(&["pkgidx", "config"]);

        let filter = build_filter(&args, Some("pkgidx_operations=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let filter = build_filter(&args, Some("  "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

        let filter = build_filter(&parse(&["pkgidx", "-v", "config"]), None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_stream_for_level() {
        assert_eq!(Stream::for_level(&Level::INFO), Stream::Stdout);
        assert_eq!(Stream::for_level(&Level::WARN), Stream::Stderr);
        assert_eq!(Stream::for_level(&Level::DEBUG), Stream::Stderr);
    }

    #[test]
    fn test_line_visitor_fields() {
        let mut line = LineVisitor::default();
        line.push_field("files", format_args!("{}", 3));
        line.push_field("workers", format_args!("{}", 4));
        assert_eq!(line.fields, "files=3 workers=4");
        assert!(line.message.is_empty());
    }
}

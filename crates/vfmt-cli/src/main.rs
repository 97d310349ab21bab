use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vfmt_error::FormatError;
use vfmt_func::{CopyStrategy, FormatFunction, FormatOptions, ScalarFunction};
use vfmt_types::{Column, FixedStringColumn, StringColumn};

const DEFAULT_FIELD_SEPARATOR: u8 = b'\t';

/// How one formatting argument is taken from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    /// Field `N` (1-based) of every line, as a variable-width column.
    Field(usize),
    /// Field `N` of every line, NUL-padded or truncated to `width` bytes.
    Fixed { field: usize, width: usize },
    /// The same text for every line.
    Const(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    pattern: String,
    separator: u8,
    bindings: Vec<Binding>,
    exact: bool,
    options_json: Option<PathBuf>,
    verbose: bool,
    show_help: bool,
}

fn main() {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut input, &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, R, W, E>(args: I, input: &mut R, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = write_usage(err);
            return 2;
        }
    };

    if options.show_help {
        if write_usage(out).is_err() {
            return 1;
        }
        return 0;
    }

    init_logging(options.verbose);

    let format_options = match load_format_options(&options) {
        Ok(format_options) => format_options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            return 2;
        }
    };

    let records = match read_records(input) {
        Ok(records) => records,
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            return 1;
        }
    };

    let arguments = match build_arguments(&records, &options.bindings, options.separator) {
        Ok(arguments) => arguments,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            return 1;
        }
    };

    let row_count = records.len();
    let mut call = Vec::with_capacity(arguments.len() + 1);
    call.push(Column::const_string(&options.pattern, row_count));
    call.extend(arguments);
    info!(
        rows = row_count,
        arguments = call.len() - 1,
        copy_strategy = format_options.copy_strategy.label(),
        "formatting input"
    );

    let function = FormatFunction::with_options(format_options);
    match function.execute(&call, row_count) {
        Ok(Column::String(column)) => {
            if out.write_all(column.chars()).and_then(|()| out.flush()).is_err() {
                return 1;
            }
            0
        }
        Ok(other) => {
            let _ = writeln!(err, "error: unexpected result column {}", other.name());
            1
        }
        Err(error) => {
            write_format_error(&error, err);
            1
        }
    }
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();

    let mut pattern: Option<String> = None;
    let mut separator = DEFAULT_FIELD_SEPARATOR;
    let mut bindings = Vec::new();
    let mut exact = false;
    let mut options_json = None;
    let mut verbose = false;
    let mut show_help = false;
    let mut only_positional = false;

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy().into_owned();

        if only_positional || arg == "-" || !arg.starts_with('-') {
            if pattern.is_some() {
                return Err(String::from(
                    "too many positional arguments; expected exactly one PATTERN",
                ));
            }
            pattern = Some(arg);
            continue;
        }
        if arg == "--" {
            only_positional = true;
            continue;
        }

        let (flag, inline_value) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_owned(), Some(value.to_owned())),
            None => (arg, None),
        };
        let takes_no_value = matches!(
            flag.as_str(),
            "-h" | "--help" | "-v" | "--verbose" | "--exact"
        );
        if takes_no_value && inline_value.is_some() {
            return Err(format!("option `{flag}` takes no value"));
        }
        let mut value = || -> Result<String, String> {
            match &inline_value {
                Some(value) => Ok(value.clone()),
                None => iter
                    .next()
                    .map(|next| next.to_string_lossy().into_owned())
                    .ok_or_else(|| format!("missing value for `{flag}`")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => show_help = true,
            "-v" | "--verbose" => verbose = true,
            "--exact" => exact = true,
            "-F" | "--separator" => separator = parse_separator(&value()?)?,
            "--field" => bindings.push(Binding::Field(parse_field_index(&value()?)?)),
            "--fixed" => bindings.push(parse_fixed(&value()?)?),
            "--const" => bindings.push(Binding::Const(value()?)),
            "--options-json" => options_json = Some(PathBuf::from(value()?)),
            _ => return Err(format!("unknown option `{flag}`")),
        }
    }

    if pattern.is_none() && !show_help {
        return Err(String::from("missing PATTERN"));
    }

    Ok(CliOptions {
        pattern: pattern.unwrap_or_default(),
        separator,
        bindings,
        exact,
        options_json,
        verbose,
        show_help,
    })
}

fn parse_separator(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(format!("field separator must be a single byte, got `{value}`")),
        },
    }
}

fn parse_field_index(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(field) if field > 0 => Ok(field),
        _ => Err(format!("field index must be a positive integer, got `{value}`")),
    }
}

fn parse_fixed(value: &str) -> Result<Binding, String> {
    let (field, width) = value
        .split_once(':')
        .ok_or_else(|| format!("`--fixed` expects FIELD:WIDTH, got `{value}`"))?;
    let field = parse_field_index(field)?;
    let width = match width.parse::<usize>() {
        Ok(width) if width > 0 => width,
        _ => return Err(format!("fixed width must be a positive integer, got `{width}`")),
    };
    Ok(Binding::Fixed { field, width })
}

fn load_format_options(options: &CliOptions) -> Result<FormatOptions, String> {
    let mut format_options = match &options.options_json {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|error| format!("cannot read `{}`: {error}", path.display()))?;
            FormatOptions::from_json(&text)
                .map_err(|error| format!("invalid options file `{}`: {error}", path.display()))?
        }
        None => FormatOptions::lines(),
    };
    if options.exact {
        format_options = format_options.with_copy_strategy(CopyStrategy::Exact);
    }
    Ok(format_options)
}

/// Input lines without their `\n` / `\r\n` terminators.
fn read_records<R: BufRead>(input: &mut R) -> io::Result<Vec<Vec<u8>>> {
    let mut records = Vec::new();
    for line in input.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        records.push(line);
    }
    Ok(records)
}

fn build_arguments(
    records: &[Vec<u8>],
    bindings: &[Binding],
    separator: u8,
) -> Result<Vec<Column>, String> {
    let rows: Vec<Vec<&[u8]>> = records
        .iter()
        .map(|record| record.split(|&byte| byte == separator).collect())
        .collect();

    let bindings = if bindings.is_empty() {
        let width = rows.first().map_or(0, Vec::len);
        (1..=width).map(Binding::Field).collect()
    } else {
        bindings.to_vec()
    };
    debug!(bindings = bindings.len(), rows = rows.len(), "binding input fields");

    let mut columns = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let column = match binding {
            Binding::Field(field) => {
                Column::from(StringColumn::from_values(field_values(&rows, *field)?))
            }
            Binding::Fixed { field, width } => {
                let values = field_values(&rows, *field)?;
                let truncated = values.iter().map(|value| &value[..value.len().min(*width)]);
                let column = FixedStringColumn::from_values(truncated, *width)
                    .map_err(|error| error.to_string())?;
                Column::from(column)
            }
            Binding::Const(text) => Column::const_string(text, rows.len()),
        };
        columns.push(column);
    }
    Ok(columns)
}

fn field_values<'a>(rows: &[Vec<&'a [u8]>], field: usize) -> Result<Vec<&'a [u8]>, String> {
    rows.iter()
        .enumerate()
        .map(|(line, fields)| {
            fields
                .get(field - 1)
                .copied()
                .ok_or_else(|| format!("line {} has no field {field}", line + 1))
        })
        .collect()
}

fn write_format_error<E: Write>(error: &FormatError, err: &mut E) {
    let _ = writeln!(err, "error: {error}");
    if let Some(hint) = error.suggestion() {
        let _ = writeln!(err, "hint: {hint}");
    }
}

/// Human-readable events on stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

fn write_usage<W>(out: &mut W) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "Usage: vfmt [OPTIONS] PATTERN\n\
         \n\
         Formats every stdin line through PATTERN. `{{}}` takes the next argument,\n\
         `{{N}}` takes argument N (0-based); write literal braces as `{{{{` and `}}}}`.\n\
         \n\
         Options:\n\
         \n\
         -F, --separator SEP     field separator byte (default: tab)\n\
         --field N               argument from field N (1-based)\n\
         --fixed N:WIDTH         argument from field N as a WIDTH-byte fixed string\n\
         --const TEXT            constant argument\n\
         --exact                 exact fragment copies instead of padded block copies\n\
         --options-json FILE     load format options (delimiter, copy_strategy) from JSON\n\
         -v, --verbose           debug logging on stderr (RUST_LOG overrides)\n\
         -h, --help              show this help\n\
         \n\
         Without --field/--fixed/--const, every field of the first line is an argument.\n\
         \n\
         Examples:\n\
         \n\
         printf 'alice\\t30\\n' | vfmt '{{}} is {{}}'\n\
         vfmt -F , --field 2 --const ' of ' --field 1 '{{}}{{}}{{}}' < pairs.csv\n",
    )
}

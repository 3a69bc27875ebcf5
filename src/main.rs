mod debug_report;

use std::io::{self, IsTerminal, Read};

use dimguard::{KnownDims, Shape, ShapeEntry, diagnose};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let report = match diagnose(&config.shape, &config.template, &config.known) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    debug_report::print_report(&config.template, &config.known, &report, config.color);
    std::process::exit(if report.matched { 0 } else { 1 });
}

struct CliConfig {
    template: String,
    shape: Shape,
    known: KnownDims,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut template: Option<String> = None;
    let mut shape: Option<Shape> = None;
    let mut known = KnownDims::new();
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("dimguard {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--shape" | "-s" => {
                let value = args.next().ok_or_else(|| "error: --shape expects a value".to_string())?;
                if shape.is_some() {
                    return Err("error: shape provided multiple times".to_string());
                }
                shape = Some(parse_shape(&value)?);
            }
            "--dims" | "-d" => {
                let value = args.next().ok_or_else(|| "error: --dims expects a value".to_string())?;
                parse_dims_into(&value, &mut known)?;
            }
            "--template" | "-t" => {
                let value = args.next().ok_or_else(|| "error: --template expects a value".to_string())?;
                if template.is_some() {
                    return Err("error: template provided multiple times".to_string());
                }
                template = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if template.is_some() {
                        return Err("error: template provided multiple times".to_string());
                    }
                    template = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--shape=") => {
                let value = arg.trim_start_matches("--shape=");
                if shape.is_some() {
                    return Err("error: shape provided multiple times".to_string());
                }
                shape = Some(parse_shape(value)?);
            }
            _ if arg.starts_with("--dims=") => {
                parse_dims_into(arg.trim_start_matches("--dims="), &mut known)?;
            }
            _ if arg.starts_with("--template=") => {
                if template.is_some() {
                    return Err("error: template provided multiple times".to_string());
                }
                template = Some(arg.trim_start_matches("--template=").to_string());
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if template.is_some() {
                    return Err("error: template provided multiple times".to_string());
                }
                template = Some(rest);
                break;
            }
        }
    }

    let template = match template {
        Some(value) => value,
        None => read_stdin_template()?,
    };
    if template.trim().is_empty() {
        return Err(format!("error: no template provided\n\n{}", help_text()));
    }
    let shape = shape.ok_or_else(|| format!("error: no shape provided (use --shape)\n\n{}", help_text()))?;

    Ok(CliConfig { template, shape, known, color })
}

fn read_stdin_template() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.trim().to_string())
}

/// Parses `64,128,?` into a shape; `?` marks a dynamic entry and an empty
/// string is the rank-0 shape.
fn parse_shape(value: &str) -> Result<Shape, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Shape::default());
    }
    let entries = trimmed
        .split(',')
        .map(|part| {
            let part = part.trim();
            if part == "?" {
                return Ok(None);
            }
            part.parse::<i64>()
                .map(Some)
                .map_err(|_| format!("error: invalid shape entry '{part}' (expected an integer or '?')"))
        })
        .collect::<Result<Vec<ShapeEntry>, String>>()?;
    Ok(Shape::new(entries))
}

/// Parses `N=24,Z=16` into the known-dims table, accumulating across flags.
fn parse_dims_into(value: &str, known: &mut KnownDims) -> Result<(), String> {
    for pair in value.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((name, size)) = pair.split_once('=') else {
            return Err(format!("error: invalid dim '{pair}' (expected NAME=SIZE)"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("error: invalid dim '{pair}' (empty name)"));
        }
        let size = size
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("error: invalid dim '{pair}' (size must be an integer)"))?;
        known.insert(name.to_string(), size);
    }
    Ok(())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "dimguard {version}

Shape-template inspector CLI.

Usage:
  dimguard [OPTIONS] --shape <dims> [--] <template...>
  dimguard [OPTIONS] --shape <dims> --template <text>

Options:
  -s, --shape <dims>         Concrete shape to guard, comma separated;
                             '?' marks a dynamic entry (e.g. 64,?,128).
  -t, --template <text>      Shape template. If omitted, reads remaining args
                             or stdin when no args are provided.
  -d, --dims <list>          Pre-seeded dimension sizes as NAME=SIZE pairs,
                             comma separated (e.g. B=64,C=3). Repeatable.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Shape matches the template.
  1  Shape does not match, or the template is malformed.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION")
    )
}

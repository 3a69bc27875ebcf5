use dimguard::{DimExpr, GuardReport, KnownDims, TemplateFlags};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_report(template: &str, known: &KnownDims, report: &GuardReport, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(
            format!("⚙  Guarding {} against \"{}\"", report.shape, template),
            ansi::CYAN
        ))
    );

    println!("\n{}", palette.paint("━━━ Template ━━━", ansi::GRAY));
    print_template(known, report, &palette);

    println!("\n{}", palette.paint("━━━ Inference ━━━", ansi::GRAY));
    print_inference(report, &palette);

    println!("\n{}", palette.paint("━━━ Verdict ━━━", ansi::GRAY));
    print_verdict(template, report, &palette);

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Passes: {}",
        palette.paint(format!("{:?}", report.trace.total), ansi::GREEN),
        palette.paint(report.trace.passes.len().to_string(), ansi::CYAN),
    );
    println!();
}

fn print_template(known: &KnownDims, report: &GuardReport, palette: &ansi::Palette) {
    for (idx, entry) in report.template.entries().iter().enumerate() {
        println!(
            "  {} {} {}",
            palette.paint(format!("[{idx}]"), ansi::GRAY),
            palette.bold(palette.paint(entry.to_string(), ansi::BLUE)),
            palette.dim(entry_kind(entry)),
        );
    }
    println!("  {} {}", palette.dim("flags:"), palette.paint(flag_names(report.flags), ansi::YELLOW));

    if !known.is_empty() {
        let mut seeded: Vec<(&String, &i64)> = known.iter().collect();
        seeded.sort();
        let rendered = seeded
            .iter()
            .map(|(name, size)| format!("{name}={size}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {} {}", palette.dim("known:"), palette.paint(rendered, ansi::CYAN));
    }
}

fn print_inference(report: &GuardReport, palette: &ansi::Palette) {
    if report.trace.passes.is_empty() {
        println!("{}", palette.dim("  No named dimensions to infer"));
        return;
    }
    for (idx, pass) in report.trace.passes.iter().enumerate() {
        println!(
            "  {} {}",
            palette.paint(format!("Pass {}:", idx + 1), ansi::BLUE),
            if pass.proposed.is_empty() {
                palette.dim("✗ fixpoint".to_string())
            } else {
                palette.paint(format!("✓ {} binding(s)", pass.proposed.len()), ansi::GREEN)
            }
        );
        for (name, size) in &pass.proposed {
            println!(
                "    {} {} {}",
                palette.paint(name, ansi::CYAN),
                palette.dim("="),
                palette.paint(size.to_string(), ansi::YELLOW)
            );
        }
    }
}

fn print_verdict(template: &str, report: &GuardReport, palette: &ansi::Palette) {
    let rank = if report.rank_ok {
        palette.paint(format!("✓ rank {}", report.shape.rank()), ansi::GREEN)
    } else {
        let wanted = if report.flags.contains(TemplateFlags::ELLIPSIS) {
            format!("at least {}", report.template.len() - 1)
        } else {
            report.template.len().to_string()
        };
        palette.paint(
            format!("✗ rank {} (template wants {wanted})", report.shape.rank()),
            ansi::RED,
        )
    };
    println!("  {rank}");

    let verdict = if report.matched {
        palette.bold(palette.paint("✓ MATCH", ansi::GREEN))
    } else {
        palette.bold(palette.paint("✗ MISMATCH", ansi::RED))
    };
    println!("  {verdict}");

    println!(
        "      {} {} {}",
        palette.dim("expected:"),
        palette.paint(report.partial.to_string(), ansi::BLUE),
        palette.dim(format!("(from template `{template}`)")),
    );
    println!(
        "      {} {}",
        palette.dim("  actual:"),
        palette.paint(report.shape.to_string(), ansi::YELLOW),
    );
    if !report.partial.is_complete() {
        if let Some(evaluated) = &report.evaluated {
            println!(
                "      {} {}",
                palette.dim("resolved:"),
                palette.paint(evaluated.to_string(), ansi::BLUE),
            );
        }
    }

    if !report.inferred.is_empty() {
        println!("  {}", palette.dim("newly inferred:"));
        for (name, size) in &report.inferred {
            if name.starts_with(dimguard::PRIVATE_PREFIX) {
                println!("{}", palette.dim(format!("    {name} = {size}  (private, not persisted)")));
            } else {
                println!(
                    "    {} {} {}",
                    palette.paint(name, ansi::CYAN),
                    palette.dim("="),
                    palette.paint(size.to_string(), ansi::GREEN)
                );
            }
        }
    }
}

fn entry_kind(entry: &DimExpr) -> &'static str {
    match entry {
        DimExpr::Fixed(_) => "fixed",
        DimExpr::Named(_) => "named",
        DimExpr::DynamicNamed(_) => "named, dynamic",
        DimExpr::Dynamic => "dynamic",
        DimExpr::Wildcard => "wildcard",
        DimExpr::Ellipsis => "ellipsis",
        DimExpr::Op { .. } => "arithmetic",
    }
}

fn flag_names(flags: TemplateFlags) -> String {
    if flags.is_empty() {
        return "none".to_string();
    }
    let mut names = Vec::new();
    for (name, flag) in [
        ("ellipsis", TemplateFlags::ELLIPSIS),
        ("wildcard", TemplateFlags::WILDCARD),
        ("named", TemplateFlags::NAMED),
        ("dynamic", TemplateFlags::DYNAMIC),
        ("arithmetic", TemplateFlags::ARITHMETIC),
    ] {
        if flags.contains(flag) {
            names.push(name);
        }
    }
    names.join(", ")
}

use typetree::{AnnotatedNode, AnnotatedTree, AnnotationVerbose, Diagnostic, RunMetrics, Severity};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
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

pub fn print_run(input: &str, out: &AnnotationVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    let tree = &out.annotation.tree;
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Annotating: {input}"), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Tree ━━━", ansi::GRAY));
    print_node(tree, tree.root(), 0, &palette);

    println!("\n{}", palette.paint("━━━ Passes ━━━", ansi::GRAY));
    print_passes(tree, &out.metrics, &palette);

    println!("\n{}", palette.paint("━━━ Diagnostics ━━━", ansi::GRAY));
    if out.annotation.diagnostics.is_empty() {
        println!("{}", palette.dim("  None"));
    } else {
        print_diagnostics(tree, &out.annotation.diagnostics, &palette);
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let passes_total: std::time::Duration = out.metrics.passes.iter().map(|pass| pass.duration).sum();
    println!(
        "  Total: {}  │  Seed: {}  │  Passes: {}",
        palette.paint(format!("{:?}", out.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", out.metrics.seed.duration), ansi::CYAN),
        palette.dim(format!("{passes_total:?}")),
    );
    println!();
}

fn print_node(tree: &AnnotatedTree, node: &AnnotatedNode, depth: usize, palette: &ansi::Palette) {
    let typing = node.typing.to_string();
    let typing = if node.is_error() { palette.paint(typing, ansi::RED) } else { palette.paint(typing, ansi::GREEN) };
    println!(
        "  {}{} {} {} {}",
        "  ".repeat(depth),
        palette.bold(&node.label.display),
        typing,
        palette.paint(node.rule.tag(), ansi::BLUE),
        palette.dim(format!("(pass {}, {})", node.pass, node.id)),
    );
    for child in &node.children {
        print_node(tree, tree.node(*child), depth + 1, palette);
    }
}

fn print_passes(tree: &AnnotatedTree, metrics: &RunMetrics, palette: &ansi::Palette) {
    for pass in std::iter::once(&metrics.seed).chain(&metrics.passes) {
        let label = match pass.pass {
            0 => "Pass 0 (lexicon):".to_string(),
            n if pass.closing => format!("Pass {n} (closing):"),
            n => format!("Pass {n}:"),
        };
        let count = pass.resolved.len();
        let summary = if count > 0 {
            palette.paint(format!("✓ {count} nodes"), ansi::GREEN)
        } else {
            palette.dim(format!("✗ {count} nodes"))
        };
        let deferred = if pass.deferred > 0 {
            palette.paint(format!("  {} deferred", pass.deferred), ansi::YELLOW)
        } else {
            String::new()
        };
        println!("  {} {}{}", palette.paint(label, ansi::BLUE), summary, deferred);

        let labels: Vec<&str> = pass.resolved.iter().map(|id| tree.node(*id).label.display.as_str()).collect();
        if !labels.is_empty() {
            println!("    {}", palette.dim(labels.join(" ")));
        }
    }
}

fn print_diagnostics(tree: &AnnotatedTree, diagnostics: &[Diagnostic], palette: &ansi::Palette) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity() {
            Severity::Error => palette.paint("error", ansi::RED),
            Severity::Warning => palette.paint("warning", ansi::YELLOW),
        };
        let at: Vec<String> = diagnostic
            .nodes()
            .into_iter()
            .map(|id| {
                let node = tree.node(id);
                format!("{} {}..{}", node.label.display, node.span.start, node.span.end)
            })
            .collect();
        println!("  {} {}", severity, diagnostic);
        if !at.is_empty() {
            println!("      {} {}", palette.dim("at:"), palette.paint(at.join(", "), ansi::YELLOW));
        }
    }
}

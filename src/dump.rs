//! Debug dump of a bound configuration with provenance.
//!
//! ```text
//! Sources:
//!   file:
//!       (picked) agent.properties
//!   overrides (1)
//!   defaults
//!
//! AgentConfiguration
//! agent.active.............. true........ DEFAULT  # Activate agent
//!     If set to `false` the agent will be completely deactivated.
//! agent.instrument.include.. [com.acme].. agent.properties:1  # Included packages
//! ```

use std::collections::HashMap;
use std::io::{self, Write};
use std::string::{String, ToString};
use std::vec::Vec;

use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use crate::config_value::{ConfigValue, Sourced};
use crate::materialized::MaterializedConfig;
use crate::provenance::{FilePathStatus, FileResolution, Provenance};

/// Environment variable that disables truncation of long values.
pub const DUMP_FULL_ENV: &str = "AGENTCFG_DUMP_FULL";

/// What the sources header should list.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpSources<'a> {
    /// File candidates and which one was picked.
    pub file_resolution: Option<&'a FileResolution>,
    /// Prefix of the env layer.
    pub env_prefix: Option<&'a str>,
    /// Number of explicit overrides.
    pub override_count: usize,
}

/// Label and description of the option behind an entry.
#[derive(Default, Clone, Copy)]
struct EntryDocs<'a> {
    label: Option<&'a str>,
    description: Option<&'a str>,
}

/// A node in the dump tree. Simple struct with optional children.
struct DumpEntry {
    key: String,
    value: String,      // Already formatted with colors. Empty for group headers.
    provenance: String, // Already formatted with colors.
    label: Option<String>,
    description: Option<String>,
    truncated: bool, // Some part of `value` was shortened.
    children: Vec<DumpEntry>,
}

impl DumpEntry {
    fn leaf(
        key: impl Into<String>,
        value: (String, bool),
        provenance: String,
        docs: EntryDocs<'_>,
    ) -> Self {
        let (value, truncated) = value;
        Self {
            key: key.into(),
            value,
            provenance,
            label: docs.label.map(ToString::to_string),
            description: docs.description.map(ToString::to_string),
            truncated,
            children: Vec::new(),
        }
    }

    fn group(key: impl Into<String>, docs: EntryDocs<'_>, children: Vec<DumpEntry>) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
            provenance: String::new(),
            label: docs.label.map(ToString::to_string),
            description: docs.description.map(ToString::to_string),
            truncated: false,
            children,
        }
    }

    fn is_group(&self) -> bool {
        !self.children.is_empty() || self.value.is_empty()
    }
}

/// Column widths at each depth level.
#[derive(Default, Clone)]
struct ColumnWidths {
    key: usize,
    value: usize,
}

/// Formatting options.
struct FormatOptions {
    max_string_length: usize,
    max_value_width: usize,
}

impl FormatOptions {
    fn from_env() -> Self {
        let full = std::env::var(DUMP_FULL_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self::new(full)
    }

    fn new(full: bool) -> Self {
        Self {
            max_string_length: if full { usize::MAX } else { 50 },
            max_value_width: 50,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Dump `config` with provenance information to a writer.
pub fn dump_config(
    w: &mut impl Write,
    config: &MaterializedConfig,
    sources: &DumpSources<'_>,
) -> io::Result<()> {
    dump_with_options(w, config, sources, &FormatOptions::from_env())
}

fn dump_with_options(
    w: &mut impl Write,
    config: &MaterializedConfig,
    sources: &DumpSources<'_>,
    opts: &FormatOptions,
) -> io::Result<()> {
    write_sources_header(w, sources)?;

    let entries = build_dump_tree(config, opts);

    let mut widths: HashMap<usize, ColumnWidths> = HashMap::new();
    compute_widths(&entries, 0, &mut widths, opts);

    writeln!(w, "{}", config.contract_name().bold())?;
    let had_truncation = render_entries(w, &entries, 0, &widths, opts)?;

    if had_truncation {
        writeln!(w)?;
        writeln!(
            w,
            "Some values were truncated. To show full values, rerun with {}=1",
            DUMP_FULL_ENV.yellow()
        )?;
    }
    Ok(())
}

// ============================================================================
// Sources Header
// ============================================================================

fn write_sources_header(w: &mut impl Write, sources: &DumpSources<'_>) -> io::Result<()> {
    writeln!(w, "Sources:")?;

    if let Some(file_resolution) = sources.file_resolution {
        writeln!(w, "  file:")?;
        if file_resolution.paths.is_empty() {
            writeln!(w, "    {}", "(no candidates)".dimmed())?;
        }

        let max_path_len = file_resolution
            .paths
            .iter()
            .map(|p| p.path.as_str().width())
            .max()
            .unwrap_or(0);

        for path_info in &file_resolution.paths {
            let status_label = match path_info.status {
                FilePathStatus::Picked => "  (picked)",
                FilePathStatus::NotTried => "(not tried)",
                FilePathStatus::Absent => "  (absent)",
            };

            let path_str = path_info.path.as_str();
            let dots = ".".repeat(max_path_len.saturating_sub(path_str.width()));

            let (colored_status, colored_path) = match path_info.status {
                FilePathStatus::Picked => (status_label.to_string(), path_str.magenta().to_string()),
                _ => (
                    status_label.dimmed().to_string(),
                    path_str.dimmed().to_string(),
                ),
            };

            writeln!(w, "    {} {}{}", colored_status, colored_path, dots)?;
        }
    }

    if let Some(prefix) = sources.env_prefix {
        if prefix.is_empty() {
            writeln!(w, "  env {}", "(all variables)".yellow())?;
        } else {
            writeln!(w, "  env {}", format!("${}__*", prefix).yellow())?;
        }
    }

    if sources.override_count > 0 {
        writeln!(w, "  overrides ({})", sources.override_count.cyan())?;
    }
    writeln!(w, "  defaults")?;
    writeln!(w)
}

// ============================================================================
// Tree Building
// ============================================================================

fn build_dump_tree(config: &MaterializedConfig, opts: &FormatOptions) -> Vec<DumpEntry> {
    config
        .iter()
        .map(|(key, sourced)| {
            let docs = config
                .contract()
                .find(key)
                .map(|o| EntryDocs {
                    label: o.label_text(),
                    description: o.description_text(),
                })
                .unwrap_or_default();
            build_entry(key, sourced, docs, opts)
        })
        .collect()
}

fn build_entry(
    key: &str,
    sourced: &Sourced<ConfigValue>,
    docs: EntryDocs<'_>,
    opts: &FormatOptions,
) -> DumpEntry {
    match &sourced.value {
        ConfigValue::Nested(nested) => {
            DumpEntry::group(key, docs, build_dump_tree(nested, opts))
        }
        value => DumpEntry::leaf(
            key,
            format_value(value, opts),
            format_provenance(&sourced.provenance),
            docs,
        ),
    }
}

/// Format a value, returning whether any string in it was shortened.
fn format_value(value: &ConfigValue, opts: &FormatOptions) -> (String, bool) {
    let formatted = match value {
        ConfigValue::String(s) => {
            let escaped = s.replace('\n', "↵");
            let (shortened, truncated) = truncate_middle(&escaped, opts.max_string_length);
            return (shortened.green().to_string(), truncated);
        }
        ConfigValue::Sequence(items) => {
            let mut truncated = false;
            let inner: Vec<String> = items
                .iter()
                .map(|item| {
                    let (formatted, item_truncated) = format_value(item, opts);
                    truncated |= item_truncated;
                    formatted
                })
                .collect();
            return (format!("[{}]", inner.join(", ")), truncated);
        }
        ConfigValue::Bool(true) => "true".green().to_string(),
        ConfigValue::Bool(false) => "false".red().to_string(),
        ConfigValue::I8(_) | ConfigValue::I16(_) | ConfigValue::I32(_) | ConfigValue::I64(_) => {
            value.to_string().blue().to_string()
        }
        ConfigValue::F32(_) | ConfigValue::F64(_) => value.to_string().bright_blue().to_string(),
        ConfigValue::Char(c) => format!("{c:?}").green().to_string(),
        ConfigValue::Enum(variant) => variant.cyan().to_string(),
        ConfigValue::Nested(nested) => nested.contract_name().bold().to_string(),
    };
    (formatted, false)
}

// ============================================================================
// Width Computation
// ============================================================================

fn compute_widths(
    entries: &[DumpEntry],
    depth: usize,
    widths: &mut HashMap<usize, ColumnWidths>,
    opts: &FormatOptions,
) {
    for entry in entries {
        if !entry.is_group() {
            let w = widths.entry(depth).or_default();
            w.key = w.key.max(visual_width(&entry.key) + 2);
            w.value = w
                .value
                .max(visual_width(&entry.value).min(opts.max_value_width) + 2);
        }
        compute_widths(&entry.children, depth + 1, widths, opts);
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render_entries(
    w: &mut impl Write,
    entries: &[DumpEntry],
    depth: usize,
    widths: &HashMap<usize, ColumnWidths>,
    opts: &FormatOptions,
) -> io::Result<bool> {
    let col = widths.get(&depth).cloned().unwrap_or_default();
    let indent = "  ".repeat(depth);
    let mut had_truncation = false;

    for entry in entries {
        had_truncation |= entry.truncated;

        let label = entry
            .label
            .as_deref()
            .map(|l| format!("  # {l}").bright_black().to_string())
            .unwrap_or_default();

        if entry.is_group() {
            writeln!(w, "{}{}{}", indent, entry.key, label)?;
        } else {
            let key_pad = ".".repeat(col.key.saturating_sub(visual_width(&entry.key)));
            let val_width = visual_width(&entry.value);

            if val_width > opts.max_value_width {
                let wrapped = wrap_value(&entry.value, opts.max_value_width);
                for (i, line) in wrapped.iter().enumerate() {
                    if i == 0 {
                        let val_pad =
                            ".".repeat(opts.max_value_width.saturating_sub(visual_width(line)));
                        writeln!(
                            w,
                            "{}{}{} {}{} {}{}",
                            indent,
                            entry.key,
                            key_pad.bright_black(),
                            line,
                            val_pad.bright_black(),
                            entry.provenance,
                            label,
                        )?;
                    } else {
                        let continuation = " ".repeat(indent.len() + col.key + 1);
                        writeln!(w, "{}{}", continuation, line)?;
                    }
                }
            } else {
                let val_pad = ".".repeat(col.value.saturating_sub(val_width));
                writeln!(
                    w,
                    "{}{}{} {}{} {}{}",
                    indent,
                    entry.key,
                    key_pad.bright_black(),
                    entry.value,
                    val_pad.bright_black(),
                    entry.provenance,
                    label,
                )?;
            }
        }

        if let Some(description) = &entry.description {
            writeln!(w, "{}    {}", indent, description.dimmed())?;
        }

        if render_entries(w, &entry.children, depth + 1, widths, opts)? {
            had_truncation = true;
        }
    }

    Ok(had_truncation)
}

// ============================================================================
// Formatting Utilities
// ============================================================================

fn format_provenance(prov: &Provenance) -> String {
    match prov {
        Provenance::Override { key } => format!("override {key}").cyan().to_string(),
        Provenance::Env { var, .. } => format!("${}", var).yellow().to_string(),
        Provenance::File { file, line, .. } => {
            let filename = file.path.file_name().unwrap_or(file.path.as_str());
            format!("{}:{}", filename, line).magenta().to_string()
        }
        Provenance::Default => "DEFAULT".bright_black().to_string(),
    }
}

fn visual_width(s: &str) -> usize {
    let stripped = strip_ansi_escapes::strip(s.as_bytes());
    let stripped_str = core::str::from_utf8(&stripped).unwrap_or(s);
    stripped_str.width()
}

fn truncate_middle(s: &str, max_length: usize) -> (String, bool) {
    let char_count = s.chars().count();
    if char_count <= max_length {
        return (s.to_string(), false);
    }
    if max_length < 3 {
        return ("...".to_string(), true);
    }

    let available = max_length - 3;
    let start_len = available.div_ceil(2);
    let end_len = available / 2;

    let start: String = s.chars().take(start_len).collect();
    let end: String = s.chars().skip(char_count - end_len).collect();

    (format!("{}...{}", start, end), true)
}

fn wrap_value(value: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;
    let mut in_ansi = false;
    let mut ansi_buffer = String::new();
    let mut active_color = String::new();

    for ch in value.chars() {
        if ch == '\x1b' {
            in_ansi = true;
            ansi_buffer.push(ch);
        } else if in_ansi {
            ansi_buffer.push(ch);
            if ch == 'm' {
                current_line.push_str(&ansi_buffer);
                active_color = ansi_buffer.clone();
                ansi_buffer.clear();
                in_ansi = false;
            }
        } else {
            if current_width >= max_width {
                lines.push(current_line);
                current_line = String::new();
                if !active_color.is_empty() {
                    current_line.push_str(&active_color);
                }
                current_width = 0;
            }
            current_line.push(ch);
            current_width += 1;
        }
    }

    if !current_line.is_empty() || !ansi_buffer.is_empty() {
        current_line.push_str(&ansi_buffer);
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

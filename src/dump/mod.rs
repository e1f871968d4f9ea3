//! Dumping a registry back into config-file syntax.
//!
//! Each flag becomes `name = value  # usage`. Values are quoted with the
//! same rules the parser unquotes, so a dump parses back to the same values.

use std::io::{self, Write};

use crate::parser::quote_value;
use crate::registry::{FlagDescriptor, FlagRegistry, CONFIG_FLAG, DUMP_FLAG};

/// Render every flag except the reserved control flags.
pub fn render_flags<R: FlagRegistry + ?Sized>(registry: &R) -> String {
    let mut flags = registry.list_all();
    flags.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    for flag in flags.iter().filter(|f| !is_reserved(&f.name)) {
        out.push_str(&render_line(flag));
    }
    out
}

/// Write the dump to `writer`, e.g. stdout in dump-and-exit mode.
pub fn write_flags<R: FlagRegistry + ?Sized, W: Write>(registry: &R, writer: &mut W) -> io::Result<()> {
    writer.write_all(render_flags(registry).as_bytes())?;
    writer.flush()
}

fn is_reserved(name: &str) -> bool {
    name == CONFIG_FLAG || name == DUMP_FLAG
}

fn render_line(flag: &FlagDescriptor) -> String {
    let value = quote_value(&flag.value);
    let usage = if value.starts_with('"') {
        // The closing quote is the last `"` on the line.
        flag.usage.replace('"', "'")
    } else {
        flag.usage.clone()
    };
    format!("{} = {}  # {}\n", flag.name, value, escape_usage(&usage))
}

fn escape_usage(usage: &str) -> String {
    usage.replace('\n', "\n    # ")
}

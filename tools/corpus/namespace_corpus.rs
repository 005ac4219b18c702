//! Namespace a corpus of template files
//!
//! Usage: `namespace-corpus <view_root> <file>...`
//!
//! Each file's namespace is derived from its path relative to `view_root`
//! (`users/show.html.erb` becomes `users-show`). The namespaced HTML is
//! printed to stdout; files that are not well formed are reported on stderr
//! and make the tool exit non-zero.

use html_namespacing::add_namespace_to_html;
use html_namespacing::template::{default_relative_path_to_namespace, is_valid_namespace};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <view_root> <file>...", args[0]);
        process::exit(1);
    }

    let view_root = Path::new(&args[1]);
    let mut failures = 0;

    for filename in &args[2..] {
        if let Err(message) = namespace_file(view_root, Path::new(filename)) {
            eprintln!("{filename}: {message}");
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} file(s) failed", args.len() - 2);
        process::exit(1);
    }
}

fn namespace_file(view_root: &Path, path: &Path) -> Result<(), String> {
    let relative = path.strip_prefix(view_root).unwrap_or(path);
    let key = relative.to_string_lossy().replace('\\', "/");

    let ns = default_relative_path_to_namespace(&key)
        .ok_or_else(|| format!("cannot derive a namespace from '{key}'"))?;
    if !is_valid_namespace(&ns) {
        return Err(format!("derived namespace '{ns}' is not a valid class name"));
    }

    let html = fs::read(path).map_err(|e| format!("error reading file: {e}"))?;
    let namespaced = add_namespace_to_html(&html, &ns).map_err(|e| e.to_string())?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&namespaced)
        .and_then(|()| stdout.write_all(b"\n"))
        .map_err(|e| format!("error writing output: {e}"))
}

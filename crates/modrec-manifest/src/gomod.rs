//! `go.mod` parser
//!
//! Line-oriented reader for the directives reconciliation needs: `module`,
//! `go`, `require`, `replace` and `exclude`, in single-line or block form.
//! `toolchain`, `godebug` and `retract` are accepted and skipped.

use std::fs;
use std::path::Path;

use modrec_core::model::ModuleRequirement;
use serde::Serialize;

use crate::errors::{io_error, manifest_parse, Result};

const MANIFEST: &str = "go.mod";

/// One `require` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Require {
    pub path: String,
    pub version: String,
    /// Marked `// indirect`
    pub indirect: bool,
}

/// One `replace` line: `old [version] => new [version]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replace {
    pub old_path: String,
    pub old_version: Option<String>,
    pub new_path: String,
    /// `None` when the replacement is a local directory
    pub new_version: Option<String>,
}

impl Replace {
    fn applies_to(&self, req: &Require) -> bool {
        self.old_path == req.path
            && self
                .old_version
                .as_deref()
                .map_or(true, |v| v == req.version)
    }
}

/// Parsed module manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoMod {
    pub module: String,
    pub go_version: Option<String>,
    pub require: Vec<Require>,
    pub replace: Vec<Replace>,
    pub exclude: Vec<ModuleRequirement>,
}

impl GoMod {
    /// Requirements in manifest order. A versioned `replace` onto the same
    /// module path substitutes its version; a replacement by another module
    /// keeps the required version, since that version names a commit of the
    /// original repository.
    pub fn requirements(&self) -> Vec<ModuleRequirement> {
        self.require
            .iter()
            .map(|req| ModuleRequirement::new(req.path.clone(), self.effective_version(req)))
            .collect()
    }

    /// Version the manifest selects for `module_path`, if it requires it
    pub fn version_for(&self, module_path: &str) -> Option<String> {
        self.require
            .iter()
            .find(|r| r.path == module_path)
            .map(|r| self.effective_version(r))
    }

    pub fn is_excluded(&self, module_path: &str, version: &str) -> bool {
        self.exclude
            .iter()
            .any(|e| e.path == module_path && e.version == version)
    }

    fn effective_version(&self, req: &Require) -> String {
        self.replace
            .iter()
            .find(|r| r.applies_to(req))
            .filter(|r| r.new_path == r.old_path)
            .and_then(|r| r.new_version.clone())
            .unwrap_or_else(|| req.version.clone())
    }
}

/// Parse a `go.mod` file from a path
///
/// # Errors
///
/// `Io` if the file cannot be read, `ManifestParse` if it is malformed.
pub fn parse_go_mod_file(path: &Path) -> Result<GoMod> {
    let content = fs::read_to_string(path).map_err(|e| io_error("read_go_mod", e))?;
    parse_go_mod_str(&content)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Require,
    Replace,
    Exclude,
    Skipped,
}

/// Parse `go.mod` content
///
/// # Errors
///
/// `ManifestParse` for unknown directives, malformed lines, an unterminated
/// block or a missing `module` directive.
pub fn parse_go_mod_str(content: &str) -> Result<GoMod> {
    let mut go_mod = GoMod::default();
    let mut module: Option<String> = None;
    let mut block: Option<(Block, usize)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let indirect = is_indirect(raw);
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some((kind, _)) = block {
            if line == ")" {
                block = None;
                continue;
            }
            parse_entry(&mut go_mod, kind, line, indirect, line_no)?;
            continue;
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let kind = match verb {
            "module" => {
                let path = unquote(rest);
                if path.is_empty() || path.contains(char::is_whitespace) {
                    return Err(manifest_parse(MANIFEST, Some(line_no), "malformed module directive"));
                }
                module = Some(path.to_string());
                continue;
            }
            "go" => {
                go_mod.go_version = Some(rest.to_string());
                continue;
            }
            "require" => Block::Require,
            "replace" => Block::Replace,
            "exclude" => Block::Exclude,
            "toolchain" | "godebug" | "retract" => Block::Skipped,
            other => {
                return Err(manifest_parse(
                    MANIFEST,
                    Some(line_no),
                    &format!("unknown directive {:?}", other),
                ))
            }
        };

        if rest == "(" {
            block = Some((kind, line_no));
        } else {
            parse_entry(&mut go_mod, kind, rest, indirect, line_no)?;
        }
    }

    if let Some((_, opened_at)) = block {
        return Err(manifest_parse(MANIFEST, Some(opened_at), "block is never closed"));
    }
    go_mod.module =
        module.ok_or_else(|| manifest_parse(MANIFEST, None, "missing module directive"))?;
    Ok(go_mod)
}

fn parse_entry(
    go_mod: &mut GoMod,
    kind: Block,
    line: &str,
    indirect: bool,
    line_no: usize,
) -> Result<()> {
    let fields: Vec<&str> = line.split_whitespace().map(unquote).collect();
    match kind {
        Block::Require => match fields.as_slice() {
            [path, version] => go_mod.require.push(Require {
                path: path.to_string(),
                version: version.to_string(),
                indirect,
            }),
            _ => {
                return Err(manifest_parse(
                    MANIFEST,
                    Some(line_no),
                    "require needs a module path and a version",
                ))
            }
        },
        Block::Exclude => match fields.as_slice() {
            [path, version] => go_mod
                .exclude
                .push(ModuleRequirement::new(*path, *version)),
            _ => {
                return Err(manifest_parse(
                    MANIFEST,
                    Some(line_no),
                    "exclude needs a module path and a version",
                ))
            }
        },
        Block::Replace => go_mod.replace.push(parse_replace(&fields, line_no)?),
        Block::Skipped => {}
    }
    Ok(())
}

fn parse_replace(fields: &[&str], line_no: usize) -> Result<Replace> {
    let arrow = fields
        .iter()
        .position(|f| *f == "=>")
        .ok_or_else(|| manifest_parse(MANIFEST, Some(line_no), "replace is missing \"=>\""))?;
    let (old, new) = (&fields[..arrow], &fields[arrow + 1..]);

    let (old_path, old_version) = match old {
        [path] => (*path, None),
        [path, version] => (*path, Some(version.to_string())),
        _ => return Err(manifest_parse(MANIFEST, Some(line_no), "malformed replace source")),
    };
    let (new_path, new_version) = match new {
        [path] if is_local_path(path) => (*path, None),
        [path, version] if !is_local_path(path) => (*path, Some(version.to_string())),
        _ => return Err(manifest_parse(MANIFEST, Some(line_no), "malformed replace target")),
    };

    Ok(Replace {
        old_path: old_path.to_string(),
        old_version,
        new_path: new_path.to_string(),
        new_version,
    })
}

fn is_local_path(path: &str) -> bool {
    path.starts_with("./") || path.starts_with("../") || path.starts_with('/') || path == "." || path == ".."
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn is_indirect(line: &str) -> bool {
    line.find("//")
        .map(|pos| line[pos + 2..].split(';').any(|part| part.trim() == "indirect"))
        .unwrap_or(false)
}

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modrec_core::errors::ExErrorKind;

    const SAMPLE: &str = r#"module github.com/hashicorp/terraform

go 1.12

require (
	github.com/aws/aws-sdk-go v1.16.36
	github.com/hashicorp/consul v0.0.0-20171026175957-610f3c86a089 // indirect
	github.com/pkg/errors v0.8.1
)

require github.com/mitchellh/cli v1.0.0

replace github.com/pkg/errors => github.com/pkg/errors v0.9.1

replace (
	github.com/mitchellh/cli v1.0.0 => ../cli
)

exclude github.com/aws/aws-sdk-go v1.16.0
"#;

    #[test]
    fn test_parse_sample() {
        let go_mod = parse_go_mod_str(SAMPLE).unwrap();
        assert_eq!(go_mod.module, "github.com/hashicorp/terraform");
        assert_eq!(go_mod.go_version.as_deref(), Some("1.12"));
        assert_eq!(go_mod.require.len(), 4);
        assert!(go_mod.require[1].indirect);
        assert!(!go_mod.require[0].indirect);
        assert_eq!(go_mod.replace.len(), 2);
        assert!(go_mod.is_excluded("github.com/aws/aws-sdk-go", "v1.16.0"));
    }

    #[test]
    fn test_requirements_keep_order_and_apply_versioned_replace() {
        let reqs = parse_go_mod_str(SAMPLE).unwrap().requirements();
        let paths: Vec<&str> = reqs.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "github.com/aws/aws-sdk-go",
                "github.com/hashicorp/consul",
                "github.com/pkg/errors",
                "github.com/mitchellh/cli",
            ]
        );
        assert_eq!(reqs[2].version, "v0.9.1");
        // Local replacement keeps the required version.
        assert_eq!(reqs[3].version, "v1.0.0");
    }

    #[test]
    fn test_fork_replacement_keeps_required_version() {
        let go_mod = parse_go_mod_str(
            "module m\nrequire github.com/a/b v1.2.3\nreplace github.com/a/b => github.com/fork/b v1.5.0\n",
        )
        .unwrap();
        let reqs = go_mod.requirements();
        assert_eq!(reqs[0].path, "github.com/a/b");
        assert_eq!(reqs[0].version, "v1.2.3");
        assert_eq!(go_mod.version_for("github.com/a/b").as_deref(), Some("v1.2.3"));
    }

    #[test]
    fn test_version_for() {
        let go_mod = parse_go_mod_str(SAMPLE).unwrap();
        assert_eq!(
            go_mod.version_for("github.com/hashicorp/consul").as_deref(),
            Some("v0.0.0-20171026175957-610f3c86a089")
        );
        assert_eq!(go_mod.version_for("github.com/unknown/mod"), None);
    }

    #[test]
    fn test_quoted_paths_and_skipped_directives() {
        let go_mod = parse_go_mod_str(
            "module \"example.com/m\"\ntoolchain go1.21.0\nretract (\n\tv1.0.1\n)\nrequire \"github.com/a/b\" v1.2.3\n",
        )
        .unwrap();
        assert_eq!(go_mod.module, "example.com/m");
        assert_eq!(go_mod.require[0].path, "github.com/a/b");
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_go_mod_str("module m\nrequire github.com/a/b\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ManifestParse);
        assert!(err.message().starts_with("go.mod:2:"));

        let err = parse_go_mod_str("module m\nrequre github.com/a/b v1\n").unwrap_err();
        assert!(err.message().contains("unknown directive"));

        let err = parse_go_mod_str("module m\nrequire (\n\tgithub.com/a/b v1.0.0\n").unwrap_err();
        assert!(err.message().contains("never closed"));
    }

    #[test]
    fn test_missing_module_directive() {
        let err = parse_go_mod_str("go 1.12\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ManifestParse);
    }
}

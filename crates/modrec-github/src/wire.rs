//! GitHub REST v3 response bodies (only the fields read)

use serde::Deserialize;

/// Object a git ref or annotated tag points at
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitObject {
    pub sha: String,
    /// `"commit"` or `"tag"` (annotated tag object)
    #[serde(rename = "type")]
    pub kind: String,
}

impl GitObject {
    pub fn is_annotated_tag(&self) -> bool {
        self.kind == "tag"
    }
}

/// `GET /repos/{owner}/{repo}/git/ref/tags/{tag}`
#[derive(Debug, Deserialize)]
pub struct RefResponse {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

/// `GET /repos/{owner}/{repo}/git/tags/{sha}`
#[derive(Debug, Deserialize)]
pub struct TagResponse {
    pub tag: String,
    pub object: GitObject,
}

/// `GET /repos/{owner}/{repo}/compare/{base}...{head}`
#[derive(Debug, Deserialize)]
pub struct CompareResponse {
    /// `ahead`, `behind`, `diverged` or `identical`
    pub status: String,
    pub ahead_by: u32,
    pub behind_by: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_response_lightweight_tag() {
        let body = r#"{
            "ref": "refs/tags/v0.9.1",
            "node_id": "MDM6UmVmNTA0NDk1NzI6djAuOS4x",
            "url": "https://api.github.com/repos/pkg/errors/git/refs/tags/v0.9.1",
            "object": {
                "sha": "645ef00459ed84a119197bfb8d8205042c6df63d",
                "type": "commit",
                "url": "https://api.github.com/repos/pkg/errors/git/commits/645ef00459ed84a119197bfb8d8205042c6df63d"
            }
        }"#;
        let r: RefResponse = serde_json::from_str(body).unwrap();
        assert_eq!(r.name, "refs/tags/v0.9.1");
        assert!(!r.object.is_annotated_tag());
    }

    #[test]
    fn test_compare_response_ignores_extra_fields() {
        let body = r#"{"status":"diverged","ahead_by":3,"behind_by":2,"total_commits":3,"commits":[]}"#;
        let c: CompareResponse = serde_json::from_str(body).unwrap();
        assert_eq!((c.ahead_by, c.behind_by), (3, 2));
        assert_eq!(c.status, "diverged");
    }
}

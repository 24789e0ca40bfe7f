//! Container naming convention
//!
//! Containers created for a project are named `<project>_<service>_<n>`.

/// Maps container names to services of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    project: String,
}

impl NamingConvention {
    /// Create the convention for a normalized project name
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
        }
    }

    /// Project name
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Instance number if `container_name` belongs to `service`
    pub fn match_service(&self, service: &str, container_name: &str) -> Option<u32> {
        let rest = container_name
            .strip_prefix(self.project.as_str())?
            .strip_prefix('_')?
            .strip_prefix(service)?
            .strip_prefix('_')?;

        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_service() {
        let naming = NamingConvention::new("blog");
        assert_eq!(naming.match_service("web", "blog_web_1"), Some(1));
        assert_eq!(naming.match_service("web", "blog_web_12"), Some(12));
    }

    #[test]
    fn test_rejects_other_projects_and_services() {
        let naming = NamingConvention::new("blog");
        assert_eq!(naming.match_service("web", "shop_web_1"), None);
        assert_eq!(naming.match_service("web", "blog_webapp_1"), None);
        assert_eq!(naming.match_service("webapp", "blog_web_1"), None);
        assert_eq!(naming.match_service("web", "blogx_web_1"), None);
    }

    #[test]
    fn test_rejects_one_off_containers() {
        let naming = NamingConvention::new("blog");
        assert_eq!(naming.match_service("web", "blog_web_run_1"), None);
        assert_eq!(naming.match_service("web", "blog_web_"), None);
    }
}

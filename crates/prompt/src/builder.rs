//! Prompt rendering.

use crate::defaults::builtin_prompts;
use crate::loader::{list_prompts, load_prompt};
use crate::types::PromptDefinition;
use concierge_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;
use std::path::Path;

/// The prompts available to one service instance.
///
/// Starts from the built-in definitions; workspace overrides replace them by id.
#[derive(Debug, Clone)]
pub struct PromptSet {
    definitions: HashMap<String, PromptDefinition>,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            definitions: builtin_prompts()
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }
}

impl PromptSet {
    /// Built-ins overlaid with every override found in the workspace.
    ///
    /// Override files whose id is not a known prompt are ignored with a warning.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        let mut set = Self::default();

        for id in list_prompts(workspace_path)? {
            if !set.definitions.contains_key(&id) {
                tracing::warn!("Ignoring prompt override for unknown id '{}'", id);
                continue;
            }
            let definition = load_prompt(workspace_path, &id)?;
            set.definitions.insert(id, definition);
        }

        Ok(set)
    }

    /// Replace a definition.
    pub fn with_definition(mut self, definition: PromptDefinition) -> Self {
        self.definitions.insert(definition.id.clone(), definition);
        self
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&PromptDefinition> {
        self.definitions.get(id)
    }

    /// Render the prompt `id` with the given variables.
    ///
    /// # Example
    /// ```
    /// use concierge_prompt::{PromptSet, ROUTER_CLASSIFY};
    ///
    /// let prompts = PromptSet::default();
    /// let text = prompts
    ///     .render(ROUTER_CLASSIFY, &[("question", "Where is ticket 42?")])
    ///     .unwrap();
    /// assert!(text.contains("Where is ticket 42?"));
    /// ```
    pub fn render(&self, id: &str, variables: &[(&str, &str)]) -> AppResult<String> {
        let definition = self
            .get(id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", id)))?;

        tracing::trace!("Rendering prompt: {}", definition.id);

        let variables: HashMap<&str, &str> = variables.iter().copied().collect();
        render_template(&definition.template, &variables)
    }
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<&str, &str>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompts: no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{POLICY_ANSWER, ROUTER_CLASSIFY, SYNTHESIS_MERGE};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question", "Hello, world!");

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_no_html_escaping() {
        let mut vars = HashMap::new();
        vars.insert("sql_query", "SELECT * FROM t WHERE a < 3 AND b = 'x'");

        let result = render_template("{{sql_query}}", &vars).unwrap();
        assert_eq!(result, "SELECT * FROM t WHERE a < 3 AND b = 'x'");
    }

    #[test]
    fn test_render_builtin_router() {
        let prompts = PromptSet::default();
        let text = prompts
            .render(ROUTER_CLASSIFY, &[("question", "What is the refund window?")])
            .unwrap();
        assert!(text.contains("SQL, POLICY, BOTH, NONE"));
        assert!(text.ends_with("Question: What is the refund window?\n"));
    }

    #[test]
    fn test_policy_prompt_keeps_citation_instructions() {
        let prompts = PromptSet::default();
        let text = prompts
            .render(
                POLICY_ANSWER,
                &[("question", "q"), ("context", "[C1] Source: a.pdf, page 1\nbody")],
            )
            .unwrap();
        assert!(text.contains("[C1] Source: a.pdf, page 1\nbody"));
        assert!(text.contains("tags like [C1], [C2]"));
    }

    #[test]
    fn test_unknown_prompt_is_error() {
        let prompts = PromptSet::default();
        let err = prompts.render("nope", &[]).unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let prompts = PromptSet::default();
        let text = prompts.render(SYNTHESIS_MERGE, &[("question", "q")]).unwrap();
        assert!(text.contains("Structured Data Agent Output:\n\n"));
    }

    #[test]
    fn test_workspace_override_replaces_builtin() {
        let temp = TempDir::new().unwrap();
        let dir = crate::loader::prompts_dir(temp.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("router.classify.yml"),
            "id: router.classify\ntitle: Terse\napiVersion: \"1.1\"\ntemplate: \"LABEL {{question}}\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("unrelated.yml"),
            "id: unrelated\ntitle: X\napiVersion: \"1.0\"\ntemplate: \"x\"\n",
        )
        .unwrap();

        let prompts = PromptSet::load(temp.path()).unwrap();
        let text = prompts.render(ROUTER_CLASSIFY, &[("question", "hi")]).unwrap();
        assert_eq!(text, "LABEL hi");
        assert!(prompts.get("unrelated").is_none());
    }
}

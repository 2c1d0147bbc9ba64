//! Built-in prompt definitions.
//!
//! Every prompt the assistant sends is defined here. A workspace may replace
//! any of them with a YAML file of the same id.

use crate::types::PromptDefinition;

/// Route classification prompt. Variables: `question`.
pub const ROUTER_CLASSIFY: &str = "router.classify";

/// Natural-language-to-SQL prompt. Variables: `question`, `schema`, `top_k`.
pub const SQL_GENERATE: &str = "sql.generate";

/// Query result summary prompt. Variables: `question`, `sql_query`, `sql_result`.
pub const SQL_SUMMARIZE: &str = "sql.summarize";

/// Grounded policy answer prompt. Variables: `question`, `context`.
pub const POLICY_ANSWER: &str = "policy.answer";

/// Final merge prompt. Variables: `question`, `sql_answer`, `policy_answer`.
pub const SYNTHESIS_MERGE: &str = "synthesis.merge";

const ROUTER_TEMPLATE: &str = r#"Classify the user question into one label:
- SQL: asks for customer profile, account, ticket history, or structured records.
- POLICY: asks for policy, terms, refund/returns/process from documents.
- BOTH: requires both customer/ticket data and policy context.
- NONE: none of the above.

Return only one label from: SQL, POLICY, BOTH, NONE.
Question: {{question}}
"#;

const SQL_GENERATE_TEMPLATE: &str = r#"You are a SQLite expert. Given an input question, write one syntactically correct SQLite SELECT query that answers it.
Unless the question asks for a specific number of rows, return at most {{top_k}} rows using LIMIT.
Query only the columns needed to answer the question. Use only the tables and columns below.
Never modify data. Return only the SQL query, with no explanation and no markdown.

Schema:
{{schema}}

Question: {{question}}
SQLQuery:"#;

const SQL_SUMMARIZE_TEMPLATE: &str = r#"You are a customer support SQL analyst.
Question: {{question}}
SQL Query: {{sql_query}}
SQL Result: {{sql_result}}

Provide a concise, user-friendly summary for a support executive.
If data is empty, say clearly no matching customer/ticket data was found.
"#;

const POLICY_ANSWER_TEMPLATE: &str = r#"You are a policy assistant for customer support.
Question: {{question}}
Policy Context:
{{context}}

Answer only using the context above and cite supporting sources inline using tags like [C1], [C2].
If context is insufficient, explicitly say what is missing.
"#;

const SYNTHESIS_TEMPLATE: &str = r#"You are a customer support copilot.
User Question: {{question}}

Structured Data Agent Output:
{{sql_answer}}

Policy Agent Output:
{{policy_answer}}

Provide a single clear response for the customer.
Preserve citation tags and source lines exactly as provided (e.g., [C1], Sources: ...).
If one source is unavailable, continue with the available source and mention the gap briefly.
"#;

/// All built-in definitions.
pub fn builtin_prompts() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition::builtin(ROUTER_CLASSIFY, "Route classifier", ROUTER_TEMPLATE),
        PromptDefinition::builtin(SQL_GENERATE, "SQL query generator", SQL_GENERATE_TEMPLATE),
        PromptDefinition::builtin(SQL_SUMMARIZE, "SQL result summary", SQL_SUMMARIZE_TEMPLATE),
        PromptDefinition::builtin(POLICY_ANSWER, "Grounded policy answer", POLICY_ANSWER_TEMPLATE),
        PromptDefinition::builtin(SYNTHESIS_MERGE, "Answer synthesis", SYNTHESIS_TEMPLATE),
    ]
}

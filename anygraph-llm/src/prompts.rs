//! Prompt templates for the analyst pipeline.
//!
//! Two templates: a routing decision (answer from context or run code, the
//! direct answer rides along in the decision JSON) and analysis-code
//! generation. The execution environment expects generated code to print
//! either plain text or a markdown pipe-table - stdout is the sole result
//! channel, so the templates spell that contract out to the model.

use anygraph_common::ColumnInfo;

/// Render schema columns as the bullet list every template embeds.
pub fn render_columns(columns: &[ColumnInfo]) -> String {
    columns
        .iter()
        .map(|col| {
            format!(
                "- {}: {} (example: {})",
                col.name,
                col.datatype,
                col.example_value.as_deref().unwrap_or("N/A")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decide whether a query needs fresh code or can be answered from context.
///
/// The model must reply with a single JSON object:
/// `{"decision": "NO_CODE" | "NEEDS_CODE", "reason": …, "direct_response": …}`.
pub fn decision_prompt(query: &str, columns: &[ColumnInfo], history_block: &str) -> String {
    let column_info = render_columns(columns);
    format!(
        r#"You are a data analysis assistant. Given a dataset schema, conversation history, and a new user query, decide if you need to run Python code to answer, or if you can answer directly from the conversation context.

Dataset Schema:
{column_info}

Previous Conversation:
{history_block}

New User Query: {query}

DECISION RULES:
- If the answer is already in the conversation history (e.g., same question was asked before), respond with "NO_CODE" and provide the answer directly.
- If the user is asking a follow-up question that can be answered from previous results, respond with "NO_CODE".
- If the user is asking for clarification or explanation about previous results, respond with "NO_CODE".
- If the user needs NEW data from the dataset (calculations, specific values, filtering, aggregations, etc.), respond with "NEEDS_CODE".
- If the user is asking about what columns exist or the schema, respond with "NO_CODE" and use the schema above.

Respond in this EXACT JSON format:
{{"decision": "NO_CODE" or "NEEDS_CODE", "reason": "brief explanation", "direct_response": "your response if NO_CODE, otherwise null"}}

Output ONLY the JSON, nothing else."#
    )
}

/// Generate pandas analysis code for a query against a dataset URL.
pub fn analysis_code_prompt(
    query: &str,
    columns: &[ColumnInfo],
    dataset_url: &str,
    history_block: &str,
) -> String {
    let column_info = render_columns(columns);
    let context_section = if history_block == "No previous conversation." {
        String::new()
    } else {
        format!(
            "\nPrevious Conversation (for context on what the user might be referring to):\n{history_block}\n"
        )
    };

    format!(
        r#"You are a Python data analysis code generator. Generate Python code to analyze a dataset.

Dataset URL: {dataset_url}
Available Columns:
{column_info}
{context_section}
User Query: {query}

Generate Python code that:
1. Imports pandas as pd and any other needed libraries
2. Loads data with: df = pd.read_csv("{dataset_url}")
3. Performs the requested analysis
4. Prints results in MARKDOWN FORMAT

OUTPUT FORMAT RULES:
- When showing tabular data (multiple rows/columns), ALWAYS use markdown tables:
  | Column1 | Column2 | Column3 |
  |---------|---------|---------|
  | value1  | value2  | value3  |
- For single values or simple results, use plain text
- Use headers (## or ###) to organize sections if needed

HELPER FUNCTION (include this for table output):
def df_to_markdown(df, max_rows=None):
    if max_rows and len(df) > max_rows:
        df = df.head(max_rows)
        note = f"\n*Showing first {{max_rows}} rows*"
    else:
        note = ""
    return df.to_markdown(index=False) + note

NOTE: If the user asks for "all", "every", or "each" item, show ALL rows (pass max_rows=None).
Only limit rows if the dataset is very large (100+ rows) and the user didn't explicitly ask for all.

CRITICAL: Use the EXACT URL provided above. Do NOT create variables for the URL.
CRITICAL: The code must be complete and runnable as-is.
CRITICAL: Print output in markdown format for better display.

Output ONLY executable Python code. No markdown code blocks, no explanations."#
    )
}

//! Prompt construction for query synthesis.
//!
//! One fixed template: data-analyst framing, the dataset profile and the
//! question embedded verbatim, the interface contract for the generated
//! program, the accepted verb set, and one worked example line anchoring the
//! output format.

use crate::query::{DATASET_BINDING, RESULT_BINDING};

/// Prompt template for query generation.
///
/// `{profile}` and `{question}` are substituted; `{df}` and `{result}` take
/// the fixed binding names shared with the executor.
const QUERY_PROMPT_TEMPLATE: &str = r#"You are a data analyst assistant. Given the following dataset and a user question, generate a query program to answer the question.

{profile}

User Question: {question}

Generate ONLY the query program needed to answer this question. The program must:
1. Use the variable '{df}' which contains the dataset
2. Store the result in a variable called '{result}'
3. Produce a table or a single column that can be displayed as a table
4. Use only the query verbs listed below

Available verbs:
- {df}.filter("Column" == value) with operators == != > >= < <=
- {df}.groupby("Column").sum("Other Column") (also mean, min, max, count())
- {df}.select("A", "B"), {df}.sort("Column"), {df}.sort("Column", "desc"), {df}.head(10)
- {df}["Column"] selects a single column; then .sum(), .mean(), .min(), .max(), .count(), .unique()

IMPORTANT: Return ONLY the program, no explanations, no markdown formatting, no backticks.

Example format:
{result} = {df}.groupby("Department").sum("Net Amount")

Code:"#;

/// Builds the full prompt for one question.
pub fn build_query_prompt(profile: &str, question: &str) -> String {
    QUERY_PROMPT_TEMPLATE
        .replace("{profile}", profile)
        .replace("{question}", question)
        .replace("{df}", DATASET_BINDING)
        .replace("{result}", RESULT_BINDING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_profile_and_question() {
        let prompt = build_query_prompt("Total Rows: 3", "Total amount by department?");
        assert!(prompt.contains("Total Rows: 3"));
        assert!(prompt.contains("User Question: Total amount by department?"));
    }

    #[test]
    fn test_prompt_states_interface_contract() {
        let prompt = build_query_prompt("p", "q");
        assert!(prompt.contains("Use the variable 'df'"));
        assert!(prompt.contains("a variable called 'result'"));
        assert!(prompt.contains("no markdown formatting, no backticks"));
    }

    #[test]
    fn test_prompt_has_worked_example() {
        let prompt = build_query_prompt("p", "q");
        assert!(prompt.contains(r#"result = df.groupby("Department").sum("Net Amount")"#));
    }

    #[test]
    fn test_prompt_has_no_unsubstituted_placeholders() {
        let prompt = build_query_prompt("p", "q");
        assert!(!prompt.contains('{'));
    }
}

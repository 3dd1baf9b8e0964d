//! The fixed prompt templates under comparison: a bare instruction, a
//! few-shot variant with worked examples, and an "agentic" variant that asks
//! the model to reason before answering.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStrategy {
    Basic,
    FewShot,
    Agentic,
}

impl PromptStrategy {
    pub const ALL: [PromptStrategy; 3] = [
        PromptStrategy::Basic,
        PromptStrategy::FewShot,
        PromptStrategy::Agentic,
    ];

    /// Stable identifier used in reports and persistence.
    pub fn id(&self) -> &'static str {
        match self {
            PromptStrategy::Basic => "prompt_1",
            PromptStrategy::FewShot => "prompt_2",
            PromptStrategy::Agentic => "prompt_3_agentic",
        }
    }

    /// Render the full prompt for one question against one schema.
    pub fn render(&self, schema_text: &str, question: &str) -> String {
        match self {
            PromptStrategy::Basic => format!(
                "Database schema:\n{schema_text}\n\nQuestion: {question}\n\n\
                 Convert to SQL. Make sure the syntax is correct:"
            ),
            PromptStrategy::FewShot => format!(
                "You are an AI assistant that converts natural language questions into SQL queries.\n\
                 You will be given a database schema and a question. Your task is to generate a \
                 correct SQL query that answers the question using the provided schema.\n\n\
                 <schema>\n{schema_text}\n</schema>\n\n\
                 <question>\n{question}\n</question>\n\n\
                 Here are a few examples of how to convert natural language questions to SQL queries:\n\
                 <examples>\n{FEW_SHOT_EXAMPLES}\n</examples>\n\n\
                 Keep in mind the following:\n\
                 - Output your final SQL query inside `<sql_query>` tags\n\
                 - Use the examples to help you convert the natural language question to SQL.\n\
                 - Use the schema to help you convert the natural language question to SQL.\n\
                 - Use the question to help you convert the natural language question to SQL.\n\n\
                 <sql_query>\n[Your SQL query here]\n</sql_query>"
            ),
            PromptStrategy::Agentic => format!(
                "You are an AI SQL assistant. Think through the problem step-by-step, then \
                 generate the SQL query.\n\n\
                 <schema>\n{schema_text}\n</schema>\n\n\
                 <question>\n{question}\n</question>\n\n\
                 Before generating SQL, think about:\n\
                 1. What tables and columns are needed?\n\
                 2. What joins are required?\n\
                 3. What filters or aggregations are needed?\n\
                 4. Verify table and column names match the schema exactly.\n\n\
                 After thinking, output ONLY the SQL query inside <sql_query> tags. \
                 Do not include any explanation or reasoning text.\n\n\
                 <sql_query>\n[Your SQL query here]\n</sql_query>"
            ),
        }
    }
}

const FEW_SHOT_EXAMPLES: &str = "\
Example 1:
Question: How many customers does each country have?
SQL: SELECT Country, COUNT(*) as CustomerCount FROM Customer GROUP BY Country ORDER BY CustomerCount DESC

Example 2:
Question: What are the top 5 best-selling genres by total sales?
SQL: SELECT g.Name, SUM(il.UnitPrice * il.Quantity) as TotalSales FROM Genre g JOIN Track t ON g.GenreId = t.GenreId JOIN InvoiceLine il ON t.TrackId = il.TrackId GROUP BY g.Name ORDER BY TotalSales DESC LIMIT 5

Example 3:
Question: List all albums by the artist 'AC/DC'
SQL: SELECT al.Title FROM Album al JOIN Artist ar ON al.ArtistId = ar.ArtistId WHERE ar.Name = 'AC/DC'";

impl fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PromptStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "prompt_1" => Ok(PromptStrategy::Basic),
            "few_shot" | "few-shot" | "prompt_2" => Ok(PromptStrategy::FewShot),
            "agentic" | "prompt_3_agentic" => Ok(PromptStrategy::Agentic),
            other => Err(format!(
                "unknown prompt strategy '{other}' (expected basic, few_shot or agentic)"
            )),
        }
    }
}

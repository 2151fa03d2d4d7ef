use forms_core::EntryForSummary;

/// Render entries oldest first as `Day N (date): reflection`, separated by
/// blank lines.
pub fn render_entries(entries: &[EntryForSummary]) -> String {
    let mut sorted: Vec<&EntryForSummary> = entries.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    sorted
        .iter()
        .enumerate()
        .map(|(i, e)| format!("Day {} ({}): {}", i + 1, e.date, e.reflection))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The single-sentence summary prompt sent upstream.
pub fn summary_prompt(project_name: &str, entries: &[EntryForSummary]) -> String {
    format!(
        "Here are the daily entries for a creative project called \"{project_name}\":\n\n\
         {}\n\n\
         Please write exactly 1 sentence that summarizes this project. \
         The tone should be encouraging and supportive but neutral, not like it's coming from a person. \
         Focus on what the project is about, what has been learned or accomplished, and where it seems to be headed. \
         Use \"you\" to address the creator directly, but avoid phrases like \"I love how\" or \"I can see\"; \
         keep it observational and encouraging without personal commentary.",
        render_entries(entries)
    )
}

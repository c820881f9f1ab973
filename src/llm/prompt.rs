use crate::llm::client::Message;
use crate::llm::taxonomy::Taxonomy;
use crate::platform::types::Issue;

pub fn system_prompt(taxonomy: &Taxonomy) -> String {
    let modules = taxonomy.display_names().join(",");
    let count = taxonomy.len();

    format!(
        r#"You are an experienced product manager for a business-intelligence product. You are familiar with products such as Salesforce, Power BI, Tableau, Looker and Metabase, and you are good at analysing what users ask for.

Your task is to tag every GitLab issue with exactly one label that names the product module it belongs to.

## Product modules
<moduleLabels>
{modules}
</moduleLabels>
There are {count} modules.

## Instructions
1. Read the issue title and description.
2. Pick the single module from <moduleLabels> that fits best.
3. Reply with the module name only, exactly as written in <moduleLabels>. Do not explain your answer."#
    )
}

pub fn issue_message(issue: &Issue, include_description: bool) -> String {
    let mut text = format!("<issueTitle>{}</issueTitle>", issue.title);
    if include_description && !issue.description.is_empty() {
        text.push_str(&format!(
            "\n\n<issueDescription>{}</issueDescription>",
            issue.description
        ));
    }
    text
}

pub fn correction_message() -> String {
    "The module you gave is not one of <moduleLabels>. Answer again with a module name from <moduleLabels> only.".to_string()
}

/// The opening turns of a classification conversation.
pub fn conversation(taxonomy: &Taxonomy, issue: &Issue, include_description: bool) -> Vec<Message> {
    vec![
        Message::system(system_prompt(taxonomy)),
        Message::user(issue_message(issue, include_description)),
    ]
}

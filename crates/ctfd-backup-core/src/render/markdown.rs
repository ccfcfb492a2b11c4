//! Markdown summaries and category indexes.
//!
//! Index renderers expect records already in their final order; they only
//! group and format.

use crate::layout::link_segment;
use crate::model::{
    value_text, ChallengeRecord, Entity, RankedMember, ScoreboardEntry, Solve, TeamRecord,
    UserRecord, NOT_AVAILABLE, UNKNOWN,
};

use super::escape_cell;

/// Member names shown per team in the ranking before the rest is summarized.
const RANKING_MEMBER_PREVIEW: usize = 5;

fn or_na(value: Option<i64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// `Scoreboard/TEAM_RANKING.md`.
pub fn team_ranking(entries: &[ScoreboardEntry]) -> String {
    let mut output = String::new();
    output.push_str("# Team Ranking\n\n");
    output.push_str(&format!("Total: {} teams\n\n", entries.len()));
    output.push_str("| Rank | Team | Score | Members | Member list |\n");
    output.push_str("|-----:|------|------:|--------:|-------------|\n");

    for team in entries {
        let pos = value_text(&team.pos).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let mut names = team
            .members
            .iter()
            .take(RANKING_MEMBER_PREVIEW)
            .map(|m| escape_cell(m.name.as_deref().unwrap_or(UNKNOWN)).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        if team.members.len() > RANKING_MEMBER_PREVIEW {
            names.push_str(&format!(
                " ... ({} more)",
                team.members.len() - RANKING_MEMBER_PREVIEW
            ));
        }
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            pos,
            escape_cell(team.display_name()),
            team.score,
            team.members.len(),
            names
        ));
    }
    output
}

/// `Scoreboard/USER_RANKING.md`; `members` is already ranked.
pub fn user_ranking(members: &[RankedMember]) -> String {
    let mut output = String::new();
    output.push_str("# User Ranking\n\n");
    output.push_str(&format!("Total: {} members\n\n", members.len()));
    output.push_str("| Rank | Member | Score | Team |\n");
    output.push_str("|-----:|--------|------:|------|\n");

    for (rank, member) in members.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            rank + 1,
            escape_cell(&member.name),
            member.score,
            escape_cell(&member.team)
        ));
    }
    output
}

/// `description.md` of one challenge.
pub fn challenge_description(challenge: &ChallengeRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", challenge.name));
    output.push_str(&format!("**Category:** {}  \n", challenge.category));
    output.push_str(&format!("**Points:** {}  \n", challenge.value));
    output.push_str(&format!("**Solves:** {}  \n", or_na(challenge.solve_count)));
    output.push_str(&format!("**Author:** {}\n\n", challenge.author));

    output.push_str("## Description\n\n");
    if challenge.description.trim().is_empty() {
        output.push_str("No description\n");
    } else {
        output.push_str(challenge.description.trim_end());
        output.push('\n');
    }

    output.push_str("\n## Solves\n\n");
    if challenge.solves.is_empty() {
        output.push_str("No solves yet.\n");
    } else {
        output.push_str("| Solver | Time |\n");
        output.push_str("|--------|------|\n");
        for solve in &challenge.solves {
            output.push_str(&format!("| {} | {} |\n", escape_cell(&solve.solver), solve.date));
        }
    }

    output.push_str("\n## Files\n\n");
    if challenge.files.is_empty() {
        output.push_str("No files.\n");
    } else {
        for file in &challenge.files {
            let failed = file.download.as_ref().is_some_and(|d| !d.ok);
            if failed {
                output.push_str(&format!("- `{}` (download failed)\n", file.name));
            } else {
                output.push_str(&format!("- `{}`\n", file.name));
            }
        }
    }
    output
}

/// `Challenges/README.md`. `challenges` must be sorted by category, then value.
pub fn challenges_index(challenges: &[ChallengeRecord]) -> String {
    let groups: Vec<&[ChallengeRecord]> = challenges
        .chunk_by(|a, b| a.category == b.category)
        .collect();

    let mut output = String::new();
    output.push_str("# Challenges\n\n");
    output.push_str(&format!(
        "Total: {} challenges in {} categories\n\n",
        challenges.len(),
        groups.len()
    ));

    for group in groups {
        output.push_str(&format!("## {}\n\n", group[0].category));
        output.push_str("| Challenge | Author | Points | Solves |\n");
        output.push_str("|-----------|--------|-------:|-------:|\n");
        for challenge in group {
            output.push_str(&format!(
                "| [{}](./{}/{}/) | {} | {} | {} |\n",
                escape_cell(&challenge.name),
                link_segment(&challenge.category),
                link_segment(&challenge.folder_name()),
                escape_cell(&challenge.author),
                challenge.value,
                challenge.solve_count.unwrap_or(challenge.solves.len() as i64)
            ));
        }
        output.push('\n');
    }
    output
}

fn push_details(output: &mut String, rows: &[(&str, String)]) {
    output.push_str("## Details\n\n");
    for (label, value) in rows {
        output.push_str(&format!("- **{}:** {}\n", label, value));
    }
    output.push('\n');
}

fn push_solves_header(output: &mut String, solves: &[Solve]) {
    output.push_str(&format!("## Solves ({})\n\n", solves.len()));
    if solves.is_empty() {
        output.push_str("No solves.\n");
    }
}

/// `Teams/{folder}/README.md`.
pub fn team_readme(team: &TeamRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", team.name));
    push_details(
        &mut output,
        &[
            ("Team ID", team.id.to_string()),
            ("Rank", format!("#{}", team.rank)),
            ("Score", team.score.to_string()),
            ("Bracket", team.bracket.clone()),
            ("Country", team.country.clone()),
            ("Affiliation", team.affiliation.clone()),
            ("Website", team.website.clone()),
        ],
    );

    output.push_str(&format!("## Members ({})\n\n", team.members.len()));
    if team.members.is_empty() {
        output.push_str("No member data.\n");
    } else {
        output.push_str("| Name | ID | Score |\n");
        output.push_str("|------|---:|------:|\n");
        for member in &team.members {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&member.name),
                member.id,
                member.score
            ));
        }
    }

    if !team.awards.is_empty() {
        output.push_str(&format!("\n## Awards ({})\n\n", team.awards.len()));
        output.push_str("| Award | Value | Time |\n");
        output.push_str("|-------|------:|------|\n");
        for award in &team.awards {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&award.name),
                award.value,
                award.date
            ));
        }
    }

    output.push('\n');
    push_solves_header(&mut output, &team.solves);
    if !team.solves.is_empty() {
        output.push_str("| Challenge | Solver | Time |\n");
        output.push_str("|-----------|--------|------|\n");
        for solve in &team.solves {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&solve.challenge),
                escape_cell(solve.user.as_deref().unwrap_or(UNKNOWN)),
                solve.date
            ));
        }
    }
    output
}

/// `Users/{folder}/README.md`.
pub fn user_readme(user: &UserRecord) -> String {
    let team = match (&user.team_name, user.team_id) {
        (Some(name), Some(id)) => format!("{} (ID: {})", name, id),
        (Some(name), None) => name.clone(),
        (None, Some(id)) => format!("ID: {}", id),
        (None, None) => NOT_AVAILABLE.to_string(),
    };

    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", user.name));
    push_details(
        &mut output,
        &[
            ("User ID", user.id.to_string()),
            ("Rank", format!("#{}", user.rank)),
            ("Score", user.score.to_string()),
            ("Team", team),
            ("Bracket", user.bracket.clone()),
            ("Country", user.country.clone()),
            ("Affiliation", user.affiliation.clone()),
            ("Website", user.website.clone()),
        ],
    );

    if !user.fields.is_empty() {
        output.push_str("## Profile\n\n");
        for field in &user.fields {
            let name = field.get("name").and_then(value_text);
            let value = field.get("value").and_then(value_text);
            output.push_str(&format!(
                "- **{}:** {}\n",
                name.as_deref().unwrap_or(UNKNOWN),
                value.as_deref().unwrap_or(NOT_AVAILABLE)
            ));
        }
        output.push('\n');
    }

    push_solves_header(&mut output, &user.solves);
    if !user.solves.is_empty() {
        output.push_str("| Challenge | Category | Points | Time |\n");
        output.push_str("|-----------|----------|-------:|------|\n");
        for solve in &user.solves {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&solve.challenge),
                escape_cell(solve.category.as_deref().unwrap_or(NOT_AVAILABLE)),
                or_na(solve.value),
                solve.date
            ));
        }
    }
    output
}

/// `Teams/README.md`. `teams` must be sorted by name.
pub fn teams_index(teams: &[TeamRecord]) -> String {
    let mut output = String::new();
    output.push_str("# Teams Index\n\n");
    output.push_str(&format!("Total: {} teams\n\n", teams.len()));
    output.push_str("| Team | ID | Members | Score |\n");
    output.push_str("|------|---:|--------:|------:|\n");
    for team in teams {
        output.push_str(&format!(
            "| [{}](./{}/) | {} | {} | {} |\n",
            escape_cell(&team.name),
            link_segment(&team.folder_name()),
            team.id,
            team.members.len(),
            team.score
        ));
    }
    output
}

/// `Users/README.md`. `users` must be sorted by name.
pub fn users_index(users: &[UserRecord]) -> String {
    let mut output = String::new();
    output.push_str("# Users Index\n\n");
    output.push_str(&format!("Total: {} users\n\n", users.len()));
    output.push_str("| User | ID | Team | Score |\n");
    output.push_str("|------|---:|------|------:|\n");
    for user in users {
        output.push_str(&format!(
            "| [{}](./{}/) | {} | {} | {} |\n",
            escape_cell(&user.name),
            link_segment(&user.folder_name()),
            user.id,
            escape_cell(user.team_name.as_deref().unwrap_or(NOT_AVAILABLE)),
            user.score
        ));
    }
    output
}

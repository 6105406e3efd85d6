use anyhow::Result;
use chrono::Utc;

use crate::error::{render, DealError};
use crate::models::{ApiResponse, Assessment, Deal, TIJUANA_FLATS};
use crate::services::{DealEvaluator, ACTIVE_WINDOW_DAYS};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub details: bool,
    pub json: bool,
}

pub async fn check_deal(evaluator: &DealEvaluator, output: OutputOptions) -> Result<()> {
    let result = evaluator.assess(Utc::now()).await;

    if output.json {
        println!("{}", json_report(&result)?);
        return Ok(());
    }

    let status = result.as_ref().map(|a| a.status);
    println!("{}", status_line(&TIJUANA_FLATS, &render(&status)));

    if output.details {
        for line in detail_lines(&TIJUANA_FLATS, result.as_ref().ok()) {
            println!("{}", line);
        }
    }

    Ok(())
}

pub fn status_line(deal: &Deal, status: &str) -> String {
    format!("{} deal status: {}", deal.name, status)
}

fn detail_lines(deal: &Deal, assessment: Option<&Assessment>) -> Vec<String> {
    let mut lines = vec![
        format!("  Team:         {}", deal.team),
        format!("  Condition:    {}", deal.condition),
        format!("  Redeem:       {}", deal.instructions),
    ];

    if let Some(game) = assessment.and_then(|a| a.game.as_ref()) {
        lines.push(format!(
            "  Last home game: {}{} ({} days ago), {} strikeouts",
            game.game_date.format("%Y-%m-%d %H:%M UTC"),
            game.opponent.as_deref().map_or(String::new(), |o| format!(" vs {}", o)),
            game.days_since,
            game.strikeouts
        ));
        if game.days_since <= ACTIVE_WINDOW_DAYS {
            lines.push(format!(
                "  Window:       {} of {} days used",
                game.days_since, ACTIVE_WINDOW_DAYS
            ));
        }
    }

    lines
}

fn json_report(result: &Result<Assessment, DealError>) -> Result<String> {
    let body = match result {
        Ok(a) => serde_json::to_string_pretty(&ApiResponse::success(a))?,
        Err(e) => serde_json::to_string_pretty(&ApiResponse::<Assessment>::error(e.to_string()))?,
    };
    Ok(body)
}

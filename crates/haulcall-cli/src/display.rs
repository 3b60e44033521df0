//! Terminal rendering of calls and configurations

use colored::{ColoredString, Colorize};
use haulcall::domain::formatters::{
    format_boolean, format_date, format_field_name, format_field_value, status_display,
    truncate_string, Tone,
};
use haulcall::{Call, CallStatus, Configuration, ConfigurationDraft};

pub fn status_badge(status: CallStatus) -> ColoredString {
    let display = status_display(status);
    match display.tone {
        Tone::Pending => display.label.yellow(),
        Tone::Active => display.label.blue(),
        Tone::Success => display.label.green(),
        Tone::Danger => display.label.red(),
        Tone::Neutral => display.label.normal(),
    }
}

/// One line of the call list
pub fn print_call_row(call: &Call) {
    println!(
        "  {} {} {} [{}] {} {}",
        call.id.dimmed(),
        truncate_string(&call.driver_name, 24).cyan().bold(),
        call.load_number,
        call.scenario_type,
        status_badge(call.call_status),
        format_date(Some(&call.created_at)).dimmed()
    );
}

/// Full record with transcript and extracted fields
pub fn print_call(call: &Call) {
    println!("{}", "Call Information:".bold());
    println!("  ID: {}", call.id);
    println!("  Driver: {}", call.driver_name.cyan());
    println!(
        "  Phone: {}",
        if call.is_web_call() {
            "Web Call".to_string()
        } else {
            call.display_phone().unwrap_or("N/A").to_string()
        }
    );
    println!("  Load Number: {}", call.load_number);
    println!("  Scenario: {}", call.scenario_type);
    println!("  Status: {}", status_badge(call.call_status));
    println!("  Created: {}", format_date(Some(&call.created_at)));
    if let Some(retell_call_id) = &call.retell_call_id {
        println!("  Retell Call: {}", retell_call_id.dimmed());
    }

    if !call.has_results() {
        if !call.call_status.is_terminal() {
            println!("\n{}", "Results will appear once the call completes.".dimmed());
        }
        return;
    }

    if let Some(data) = call.structured_data.as_ref().filter(|data| !data.is_empty()) {
        println!("\n{}", "Structured Data:".bold());
        for (name, value) in data {
            println!("  {}: {}", format_field_name(name), format_field_value(value));
        }
    }

    if let Some(transcript) = &call.raw_transcript {
        println!("\n{}", "Transcript:".bold());
        for line in transcript.lines() {
            println!("  {}", line);
        }
    }
}

/// Draft fields; `baseline` tells whether the scenario was ever saved
pub fn print_draft(draft: &ConfigurationDraft, baseline: Option<&Configuration>) {
    let settings = &draft.retell_settings;

    println!(
        "{} {}",
        "Scenario:".bold(),
        draft.scenario_type.to_string().cyan()
    );
    match baseline {
        Some(saved) => {
            if let Some(agent_id) = &saved.agent_id {
                println!("  Agent: {}", agent_id.dimmed());
            }
            if saved.created_at.is_some() {
                println!("  Created: {}", format_date(saved.created_at.as_ref()));
            }
        }
        None => println!("  {}", "Not configured yet, showing defaults".yellow()),
    }

    println!("\n{}", "Voice Settings:".bold());
    println!("  Voice ID: {}", settings.voice_id);
    println!("  Voice Speed: {}", settings.voice_speed);
    println!("  Voice Temperature: {}", settings.voice_temperature);
    println!("  Responsiveness: {}", settings.responsiveness);
    println!("  Interruption Sensitivity: {}", settings.interruption_sensitivity);
    println!(
        "  Backchannel: {} ({})",
        format_boolean(settings.enable_backchannel),
        settings.backchannel_frequency
    );
    println!(
        "  Ambient Sound: {} ({})",
        settings.ambient_sound.as_deref().unwrap_or("off"),
        settings.ambient_sound_volume
    );

    println!("\n{}", "System Prompt:".bold());
    if draft.system_prompt.is_empty() {
        println!("  {}", "(empty)".dimmed());
    } else {
        for line in draft.system_prompt.lines() {
            println!("  {}", line);
        }
    }
}

/// One line of the configuration list
pub fn print_configuration_row(configuration: &Configuration) {
    println!(
        "  {} {} {}",
        configuration.scenario_type.to_string().cyan().bold(),
        configuration.retell_settings.voice_id.dimmed(),
        truncate_string(&configuration.system_prompt.replace('\n', " "), 60)
    );
}

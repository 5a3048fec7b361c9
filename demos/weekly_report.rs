//! Generate a four-week analysis report for a cutting user

fn main() {
    let mut weights = Vec::new();
    let mut logs = Vec::new();
    for day in 0..28u32 {
        let date = format!("2024-02-{:02}", day + 1);
        let weight = 84.0 - 0.06 * day as f64 + if day % 3 == 0 { 0.3 } else { 0.0 };
        // Sundays skipped (Feb 4, 11, 18, 25)
        if day % 7 != 3 {
            weights.push(format!(r#"{{"date": "{date}", "weight_kg": {weight:.2}}}"#));
            let calories = if day % 7 == 2 { 2600.0 } else { 1900.0 };
            logs.push(format!(
                r#"{{"date": "{date}", "calories": {calories}, "protein_g": 150, "carbs_g": 190, "fat_g": 65}}"#
            ));
        }
    }

    let request = format!(
        r#"{{
            "biometrics": {{
                "weight_kg": 84.0, "height_cm": 180.0, "age": 34, "gender": "male",
                "activity_level": "light", "goal_type": "cut", "weekly_goal": "lose1"
            }},
            "weights": [{}],
            "logs": [{}],
            "targets": {{"calories": 1950, "protein_g": 160}},
            "today": "2024-02-28"
        }}"#,
        weights.join(","),
        logs.join(",")
    );

    match metabolic_flux::analyze_json(&request) {
        Ok(report) => print!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}

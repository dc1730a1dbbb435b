//! Interactive collection of trip details

use std::io::{self, BufRead, Write};

use tripcrew::TripContext;

use super::commands::PlanArgs;

const QUESTIONS: [&str; 4] = [
    "From where are you traveling? (e.g., New York): ",
    "What cities are you considering? (e.g., Paris, Tokyo): ",
    "When are you traveling? (e.g., June 2024): ",
    "What are your interests? (e.g., food, museums): ",
];

/// Fill every field not given on the command line by asking on `output`
///
/// Answers are trimmed. End of input or an answer that is not valid UTF-8
/// leaves the field empty.
pub fn collect_trip<R: BufRead, W: Write>(args: &PlanArgs, input: &mut R, output: &mut W) -> io::Result<TripContext> {
    let given = [&args.origin, &args.cities, &args.date_range, &args.interests];
    let mut answers: Vec<String> = Vec::with_capacity(4);

    for (question, value) in QUESTIONS.iter().zip(given) {
        let answer = match value {
            Some(v) => v.trim().to_string(),
            None => ask(question, input, output)?,
        };
        answers.push(answer);
    }

    let [origin, cities, date_range, interests]: [String; 4] = answers
        .try_into()
        .map_err(|_| io::Error::other("expected four answers"))?;
    Ok(TripContext::new(origin, cities, date_range, interests))
}

fn ask<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = Vec::new();
    input.read_until(b'\n', &mut line)?;
    match String::from_utf8(line) {
        Ok(answer) => Ok(answer.trim().to_string()),
        Err(e) => {
            log::warn!("Ignoring answer that is not valid UTF-8: {}", e);
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_asks_only_for_missing_fields() {
        let args = PlanArgs {
            origin: Some("New York".to_string()),
            interests: Some(" food ".to_string()),
            ..PlanArgs::default()
        };
        let mut input = Cursor::new("Paris, Tokyo\n  June 2024  \n");
        let mut output = Vec::new();

        let trip = collect_trip(&args, &mut input, &mut output).unwrap();

        assert_eq!(trip, TripContext::new("New York", "Paris, Tokyo", "June 2024", "food"));
        let asked = String::from_utf8(output).unwrap();
        assert_eq!(asked, format!("{}{}", QUESTIONS[1], QUESTIONS[2]));
    }

    #[test]
    fn test_end_of_input_leaves_fields_blank() {
        let mut input = Cursor::new("Lisbon\n");
        let mut output = Vec::new();

        let trip = collect_trip(&PlanArgs::default(), &mut input, &mut output).unwrap();

        assert_eq!(trip.origin, "Lisbon");
        assert_eq!(trip.blank_fields(), vec!["cities", "date_range", "interests"]);
    }

    #[test]
    fn test_invalid_utf8_answer_is_blank() {
        let mut input = Cursor::new(b"Lisbon\n\xff\xfe Paris\nJune 2024\nfood\n".to_vec());
        let mut output = Vec::new();

        let trip = collect_trip(&PlanArgs::default(), &mut input, &mut output).unwrap();

        assert_eq!(trip.origin, "Lisbon");
        assert_eq!(trip.date_range, "June 2024");
        assert_eq!(trip.blank_fields(), vec!["cities"]);
        assert!(!trip.is_complete());
    }
}

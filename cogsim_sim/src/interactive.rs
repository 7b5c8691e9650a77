//! Interactive condition builder.
//!
//! Walks an operator through naming an experiment, choosing the variables to
//! manipulate and picking a high/low variant of each for every condition.
//! Works over any `BufRead`/`Write` pair so sessions can be scripted.

use crate::error::{InputError, SimError};
use crate::experiment::{Condition, Experiment, ExperimentDefaults};
use crate::library::VariableLibrary;

use cogsim_core::Participant;
use std::io::{BufRead, Write};
use tracing::debug;

/// Largest number of conditions one session may register.
pub const MAX_CONDITIONS: i64 = 10;

/// Pseudo-variable selecting the observed outcome.
pub const SUCCESS_CHOICE: &str = "success";

/// Pseudo-variable selecting the sample budget.
pub const BUDGET_CHOICE: &str = "L";

/// Parses an integer in `min..=max`.
pub fn parse_count(text: &str, min: i64, max: i64) -> Result<i64, InputError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidInteger(text.trim().to_string()))?;
    if value < min || value > max {
        return Err(InputError::OutOfRange { value, min, max });
    }
    Ok(value)
}

/// Line-oriented question/answer channel.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes a line to the operator.
    pub fn say(&mut self, text: &str) -> Result<(), SimError> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Asks a question and returns the trimmed answer.
    pub fn ask(&mut self, question: &str) -> Result<String, SimError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::EndOfInput.into());
        }
        Ok(line.trim().to_string())
    }

    /// Asks until the answer is an integer in `min..=max`.
    pub fn ask_count(&mut self, question: &str, min: i64, max: i64) -> Result<i64, SimError> {
        loop {
            let answer = self.ask(question)?;
            match parse_count(&answer, min, max) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    /// Asks a y/n question until it gets one of the two.
    pub fn confirm(&mut self, question: &str) -> Result<bool, SimError> {
        let mut question = question;
        loop {
            match self.ask(question)?.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => {
                    self.say("This was not a valid answer")?;
                    question = "Next try: ";
                }
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// Runs the condition-builder dialogue and returns the assembled experiment.
///
/// An unknown variable or an invalid level ends the session with an
/// [`InputError`]; bad integers are re-asked.
pub fn build_experiment<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    library: &VariableLibrary,
    participant: Participant,
    defaults: ExperimentDefaults,
) -> Result<Experiment, SimError> {
    let name = prompter.ask("What is the name of your experiment? (string): ")?;
    let num_conditions = prompter.ask_count(
        &format!("How many conditions does the experiment have? (0-{}): ", MAX_CONDITIONS),
        0,
        MAX_CONDITIONS,
    )?;

    let mut menu = String::from("What variables should be manipulated? Enter their names separated by spaces:\n");
    menu.push_str(&format!("  {} (s/f)\n  {} (number of samples)\n", SUCCESS_CHOICE, BUDGET_CHOICE));
    for variable in library.names() {
        menu.push_str(&format!("  {} (h/l)\n", variable));
    }
    menu.push_str("Variables not listed keep their default distribution\n: ");
    let chosen: Vec<String> = prompter
        .ask(&menu)?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    for variable in &chosen {
        if variable != SUCCESS_CHOICE && variable != BUDGET_CHOICE && !library.contains(variable) {
            return Err(InputError::UnknownVariable(variable.clone()).into());
        }
    }

    let mut experiment = Experiment::new(name, participant, defaults);
    for i in 0..num_conditions {
        let condition_name = prompter.ask(&format!("What is the name of condition {} (string): ", i))?;
        let participants = prompter.ask_count("What is the number of participants (int): ", 0, i64::MAX)?;
        let mut condition = Condition::new(condition_name, participants as usize);

        for variable in &chosen {
            match variable.as_str() {
                SUCCESS_CHOICE => {
                    let answer = prompter.ask(&format!("Outcome in condition {} [s/f]: ", condition.name))?;
                    condition = match answer.as_str() {
                        "s" => condition.with_success(true),
                        "f" => condition.with_success(false),
                        other => {
                            return Err(InputError::InvalidLevel {
                                variable: variable.clone(),
                                level: other.to_string(),
                            }
                            .into())
                        }
                    };
                }
                BUDGET_CHOICE => {
                    let budget = prompter.ask_count(
                        &format!("Number of samples in condition {} (int): ", condition.name),
                        1,
                        i64::MAX,
                    )?;
                    condition = condition.with_sample_budget(budget as usize);
                }
                _ => {
                    let answer = prompter.ask(&format!(
                        "Value of {} in condition {} [h/l]: ",
                        variable, condition.name
                    ))?;
                    condition = condition.with_variable(library.lookup(variable, &answer)?);
                }
            }
        }

        debug!("Registered condition {:?}", condition);
        experiment.register_condition(condition);
    }

    Ok(experiment)
}

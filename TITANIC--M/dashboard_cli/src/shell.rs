use std::{
    io::{BufRead, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use titanic_analytics::{
    AgeInput, Dashboard, LifeboatCount, PassengerClass, PredictionInput, Sex, View, ViewRequest,
    ViewSelector,
};

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Views,
    Quit,
    Show(View),
    Predict {
        age: Option<AgeInput>,
        sex: Option<Sex>,
        class: Option<PassengerClass>,
    },
    Scenario(Option<LifeboatCount>),
}

const HELP: &str = "\
commands:
  views                                list the views
  route-map | survival | heatmap       render a chart view
  predict [age=N] [sex=S] [class=N]    survival prediction (age 1-80, sex male|female, class 1-3)
  scenario [lifeboats=N]               lifeboat scenario (20-60 boats)
  help                                 this text
  quit                                 leave the shell";

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let command = match head.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "views" => ShellCommand::Views,
        "quit" | "exit" => ShellCommand::Quit,
        "predict" => {
            let (mut age, mut sex, mut class) = (None, None, None);
            for (key, value) in key_values(&args)? {
                match key {
                    "age" => age = Some(AgeInput::try_from(parse_number(key, value)?)?),
                    "sex" => sex = Some(value.parse::<Sex>()?),
                    "class" => {
                        class = Some(PassengerClass::try_from(parse_number(key, value)?)?);
                    }
                    other => bail!("predict has no `{other}` input (expected age, sex or class)"),
                }
            }
            ShellCommand::Predict { age, sex, class }
        }
        "scenario" => {
            let mut lifeboats = None;
            for (key, value) in key_values(&args)? {
                match key {
                    "lifeboats" | "boats" => {
                        lifeboats = Some(LifeboatCount::try_from(parse_number(key, value)?)?);
                    }
                    other => bail!("scenario has no `{other}` input (expected lifeboats)"),
                }
            }
            ShellCommand::Scenario(lifeboats)
        }
        other => {
            let view: View = other.parse()?;
            if !args.is_empty() {
                bail!("{view} takes no inputs");
            }
            match view {
                View::SurvivalPrediction => ShellCommand::Predict {
                    age: None,
                    sex: None,
                    class: None,
                },
                View::ScenarioSimulation => ShellCommand::Scenario(None),
                _ => ShellCommand::Show(view),
            }
        }
    };
    Ok(Some(command))
}

fn key_values<'a>(args: &[&'a str]) -> Result<Vec<(&'a str, &'a str)>> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.trim(), value.trim()))
                .with_context(|| format!("expected key=value, got {arg:?}"))
        })
        .collect()
}

fn parse_number(key: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .with_context(|| format!("{key} must be a whole number, got {value:?}"))
}

/// Widget values kept between interactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellState {
    selector: ViewSelector,
    prediction: PredictionInput,
    lifeboats: LifeboatCount,
}

impl ShellState {
    /// Applies a render command; returns `None` for commands that draw nothing.
    pub fn apply(&mut self, command: &ShellCommand) -> Option<ViewRequest> {
        let request = match *command {
            ShellCommand::Help | ShellCommand::Views | ShellCommand::Quit => return None,
            ShellCommand::Show(view) => ViewRequest::default_for(view),
            ShellCommand::Predict { age, sex, class } => {
                self.prediction = PredictionInput {
                    age: age.unwrap_or(self.prediction.age),
                    sex: sex.unwrap_or(self.prediction.sex),
                    class: class.unwrap_or(self.prediction.class),
                };
                ViewRequest::SurvivalPrediction(self.prediction)
            }
            ShellCommand::Scenario(lifeboats) => {
                self.lifeboats = lifeboats.unwrap_or(self.lifeboats);
                ViewRequest::ScenarioSimulation {
                    lifeboats: self.lifeboats,
                }
            }
        };
        self.selector.select(request.view());
        Some(request)
    }

    pub const fn current_view(&self) -> View {
        self.selector.current()
    }
}

/// Reads commands until `quit` or end of input. Each render is synchronous
/// and reuses the dashboard's cached dataset and model; bad input is
/// reported and the loop continues.
pub fn run<R: BufRead, W: Write>(
    dashboard: &Dashboard,
    out_dir: &Path,
    input: R,
    output: &mut W,
) -> Result<()> {
    let mut state = ShellState::default();
    writeln!(output, "titanic-dash shell; type `help` for commands")?;
    prompt(output, state.current_view())?;
    for line in input.lines() {
        let line = line.context("reading shell input")?;
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(ShellCommand::Help)) => writeln!(output, "{HELP}")?,
            Ok(Some(ShellCommand::Views)) => {
                for view in View::ALL {
                    writeln!(output, "  {:<10} {}", view.slug(), view.title())?;
                }
            }
            Ok(Some(command)) => {
                if let Some(request) = state.apply(&command) {
                    match render_and_write(dashboard, &request, out_dir) {
                        Ok(report) => writeln!(output, "{report}")?,
                        Err(err) => writeln!(output, "error: {err:#}")?,
                    }
                }
            }
            Err(err) => writeln!(output, "error: {err:#}")?,
        }
        prompt(output, state.current_view())?;
    }
    writeln!(output)?;
    Ok(())
}

fn prompt<W: Write>(output: &mut W, view: View) -> Result<()> {
    write!(output, "[{view}]> ")?;
    output.flush()?;
    Ok(())
}

/// Renders `request`, writes its files and returns the text shown to the user.
pub fn render_and_write(
    dashboard: &Dashboard,
    request: &ViewRequest,
    out_dir: &Path,
) -> Result<String> {
    let rendered = dashboard.render(request)?;
    let written = rendered.write_to(out_dir)?;
    let files = written
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "== {} ==\n{}\nwrote {files}",
        rendered.title, rendered.summary
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;
    use titanic_analytics::{
        DashboardConfig, DashboardTelemetry, PassengerRecord, PassengerTable,
    };

    fn dashboard() -> Dashboard {
        let mut records = Vec::new();
        for idx in 0..40u32 {
            records.push(PassengerRecord {
                survived: idx % 3 == 0,
                class: PassengerClass::ALL[(idx % 3) as usize],
                sex: if idx % 2 == 0 { Sex::Female } else { Sex::Male },
                age: f64::from(idx * 2 + 1),
            });
        }
        let mut config = DashboardConfig::default();
        config.model.trees = 10;
        Dashboard::with_table(
            config,
            PassengerTable::new(records, "fixture.csv", 40),
            DashboardTelemetry::disabled("dashboard"),
        )
    }

    #[test]
    fn parses_prediction_inputs() {
        let command = parse_command("predict age=30 sex=female class=2").unwrap();
        assert_eq!(
            command,
            Some(ShellCommand::Predict {
                age: Some(AgeInput::new(30).unwrap()),
                sex: Some(Sex::Female),
                class: Some(PassengerClass::Second),
            })
        );
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(
            parse_command("route-map").unwrap(),
            Some(ShellCommand::Show(View::RouteMap))
        );
    }

    #[test]
    fn rejects_out_of_range_widgets() {
        let err = parse_command("predict age=81").unwrap_err();
        assert!(format!("{err:#}").contains("age must be between 1 and 80, got 81"));
        assert!(parse_command("scenario lifeboats=61").is_err());
        assert!(parse_command("predict class=4").is_err());
        assert!(parse_command("predict sex=unknown").is_err());
        assert!(parse_command("predict age").is_err());
        let err = parse_command("predict age=300").unwrap_err();
        assert!(format!("{err:#}").contains("age must be between 1 and 80, got 300"));
        let err = parse_command("scenario lifeboats=-5").unwrap_err();
        assert!(format!("{err:#}").contains("got -5"));
        let err = parse_command("predict age=old").unwrap_err();
        assert!(format!("{err:#}").contains("age must be a whole number"));
        assert!(parse_command("globe").is_err());
    }

    #[test]
    fn state_keeps_widget_values_between_interactions() {
        let mut state = ShellState::default();
        assert_eq!(state.current_view(), View::RouteMap);
        state.apply(&parse_command("predict sex=female").unwrap().unwrap());
        let request = state
            .apply(&parse_command("predict age=60").unwrap().unwrap())
            .unwrap();
        match request {
            ViewRequest::SurvivalPrediction(input) => {
                assert_eq!(input.age.years(), 60);
                assert_eq!(input.sex, Sex::Female);
                assert_eq!(input.class, PassengerClass::First);
            }
            other => panic!("unexpected request {other:?}"),
        }
        assert_eq!(state.current_view(), View::SurvivalPrediction);
        assert_eq!(state.apply(&ShellCommand::Help), None);
    }

    #[test]
    fn session_survives_bad_input() {
        let dir = tempdir().unwrap();
        let dashboard = dashboard();
        let script = "views\npredict age=200\nscenario lifeboats=40\n\
                      predict age=30 sex=female class=2\nquit\nheatmap\n";
        let mut output = Vec::new();
        run(&dashboard, dir.path(), Cursor::new(script), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("error: age must be between 1 and 80, got 200"));
        assert!(text.contains("76.0%"));
        assert!(text.contains("== Survival Prediction =="));
        assert!(!text.contains("== Age Group Heatmap =="));
        assert!(dir.path().join("scenario.svg").exists());
        assert!(dir.path().join("predict.json").exists());
        assert!(dashboard.model_trained());
    }
}

use std::io::{BufRead, Write};
use anyhow::Context;
use clap::{Parser, Subcommand};
use time::Date;
use tracing::debug;
use crate::controller::car_catalog_controller::{FormField, BOOKING_CREATED};
use crate::controller::{App, ViewError};
use crate::helpers::confirm::{is_affirmative, Confirm};
use crate::models::booking::{BookingId, BookingStatus};
use crate::models::car::CarId;
use crate::models::date::parse_date;
use crate::repositories::session_store::SessionStore;
use crate::repositories::RentalApi;

/// One line typed at the prompt.
#[derive(Parser, Debug)]
#[clap(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
pub struct ShellLine {
    #[clap(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Log in with email and password
    Login { email: String, password: String },
    /// Create a customer account: register <email> <password> <full name>
    Register {
        email: String,
        password: String,
        #[clap(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Switch the auth form between login and register
    Mode,
    /// Forget the current identity
    Logout,
    /// Filter cars by date range (YYYY-MM-DD); omit either to list all
    Filter {
        #[clap(value_parser = parse_date_arg)]
        start: Option<Date>,
        #[clap(value_parser = parse_date_arg)]
        end: Option<Date>,
    },
    /// Clear the date filter and list every car
    ShowAll,
    /// Reload cars with the current filter
    Cars,
    /// Book a car for the filtered dates
    Book { car_id: CarId },
    /// Fill a field of the car form: make, model, year, color or price
    Form {
        field: FormField,
        #[clap(num_args = 0.., allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Load a listed car into the form for updating
    Edit { car_id: CarId },
    /// Leave edit mode and clear the form
    CancelEdit,
    /// Add the car in the form, or update the one being edited
    SubmitCar,
    /// Delete a car after confirmation
    Delete { car_id: CarId },
    /// Reload the booking list
    Bookings,
    /// Cancel one of your bookings
    Cancel { booking_id: BookingId },
    /// Pick a new status for a booking without saving it
    Draft { booking_id: BookingId, status: BookingStatus },
    /// Save the drafted status of a booking
    Save { booking_id: BookingId },
    /// Leave the shell
    #[clap(alias = "exit")]
    Quit,
}

fn parse_date_arg(text: &str) -> Result<Date, String> {
    parse_date(text).map_err(|_| format!("'{}' is not a date, expected YYYY-MM-DD", text))
}

/// Reads answers to confirmation prompts from the same input as commands.
struct Prompt<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Confirm for Prompt<'_, R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{} [y/N] ", prompt).and_then(|_| self.output.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Shell<A, S, R, W> {
    app: App<A, S>,
    input: R,
    output: W,
}

impl<A: RentalApi, S: SessionStore, R: BufRead, W: Write> Shell<A, S, R, W> {
    pub fn new(app: App<A, S>, input: R, output: W) -> Self {
        Self { app, input, output }
    }

    pub fn app(&self) -> &App<A, S> {
        &self.app
    }

    /// Runs until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        if let Err(e) = self.app.start().await {
            self.alert(&e)?;
        }
        self.print_screen()?;

        loop {
            write!(self.output, "> ").context("Failed to write prompt")?;
            self.output.flush().context("Failed to flush prompt")?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read command")?;
            if read == 0 {
                writeln!(self.output).context("Failed to write output")?;
                return Ok(());
            }

            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            let parsed = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed,
                Err(e) => {
                    write!(self.output, "{}", e).context("Failed to write output")?;
                    continue;
                }
            };
            debug!("Shell command: {:?}", parsed.command);

            if let Flow::Quit = self.dispatch(parsed.command).await? {
                return Ok(());
            }
            self.print_screen()?;
        }
    }

    async fn dispatch(&mut self, command: ShellCommand) -> anyhow::Result<Flow> {
        let result = match command {
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Login { email, password } => self.app.login(&email, &password).await,
            ShellCommand::Register { email, password, name } => {
                self.app.register(&name.join(" "), &email, &password).await
            }
            ShellCommand::Mode => {
                self.app.toggle_auth_mode();
                Ok(())
            }
            ShellCommand::Logout => {
                self.app.logout();
                Ok(())
            }
            ShellCommand::Filter { start, end } => self.app.apply_filter(start, end).await,
            ShellCommand::ShowAll => self.app.reset_filter().await,
            ShellCommand::Cars => self.app.reload_cars().await,
            ShellCommand::Book { car_id } => match self.app.book(car_id).await {
                Ok(booked) => {
                    self.notice(BOOKING_CREATED)?;
                    booked.reload
                }
                Err(e) => Err(e),
            },
            ShellCommand::Form { field, value } => self.app.set_car_field(field, &value.join(" ")),
            ShellCommand::Edit { car_id } => self.app.start_edit(car_id),
            ShellCommand::CancelEdit => {
                self.app.cancel_edit();
                Ok(())
            }
            ShellCommand::SubmitCar => self.app.submit_car().await.map(|_| ()),
            ShellCommand::Delete { car_id } => {
                let mut prompt = Prompt {
                    input: &mut self.input,
                    output: &mut self.output,
                };
                self.app.delete_car(car_id, &mut prompt).await
            }
            ShellCommand::Bookings => self.app.reload_bookings().await,
            ShellCommand::Cancel { booking_id } => self.app.cancel_booking(booking_id).await,
            ShellCommand::Draft { booking_id, status } => self.app.set_draft_status(booking_id, status),
            ShellCommand::Save { booking_id } => self.app.save_status(booking_id).await.map(|_| ()),
        };

        match result {
            Ok(()) | Err(ViewError::Declined) => {}
            Err(e) => self.alert(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn notice(&mut self, message: &str) -> anyhow::Result<()> {
        writeln!(self.output, "* {}", message).context("Failed to write output")
    }

    fn alert(&mut self, err: &ViewError) -> anyhow::Result<()> {
        writeln!(self.output, "! {}", err).context("Failed to write output")
    }

    fn print_screen(&mut self) -> anyhow::Result<()> {
        let screen = self.app.render();
        writeln!(self.output, "\n{}", screen).context("Failed to write output")
    }
}

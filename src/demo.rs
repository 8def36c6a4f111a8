#![allow(clippy::print_stdout)]

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use busyline::platform::Platform;
use busyline::{Spinner, SpinnerOptions};
use tracing::info;

use crate::Scenario;

pub struct Demo {
    pub pause: Duration,
    pub speed: Option<Duration>,
    pub frames: Vec<String>,
}

impl Demo {
    pub fn run(&self, scenario: Scenario) -> Result<()> {
        info!(scenario = scenario_name(scenario), "running scenario");
        match scenario {
            Scenario::All => {
                self.outcomes()?;
                self.reuse()?;
                self.frames()?;
                self.speed()?;
                self.messages()?;
                self.misuse()?;
                self.interrupt()
            }
            Scenario::Outcomes => self.outcomes(),
            Scenario::Reuse => self.reuse(),
            Scenario::Frames => self.frames(),
            Scenario::Speed => self.speed(),
            Scenario::Messages => self.messages(),
            Scenario::Misuse => self.misuse(),
            Scenario::Interrupt => self.interrupt(),
        }
    }

    fn options(&self, message: &str) -> SpinnerOptions {
        let mut options = Spinner::options().message(message);
        if let Some(speed) = self.speed {
            options = options.interval(speed);
        }
        if !self.frames.is_empty() {
            options = options.glyphs(self.frames.iter().cloned());
        }
        options
    }

    fn spinner(&self, message: &str) -> Result<Spinner> {
        self.options(message)
            .build()
            .context("invalid spinner settings")
    }

    fn wait(&self) {
        thread::sleep(self.pause);
    }

    fn outcomes(&self) -> Result<()> {
        let spinner = self.spinner("This is a success")?;
        spinner.start()?;
        self.wait();
        spinner.success();

        let spinner = self.spinner("This is an error")?;
        spinner.start()?;
        self.wait();
        spinner.error();

        let spinner = self.spinner("This is a custom success message")?;
        spinner.start()?;
        self.wait();
        spinner.success_with("Awesome!");

        let spinner = self.spinner("This is a custom error message")?;
        spinner.start()?;
        self.wait();
        spinner.error_with("Much sad");

        let spinner = self.spinner("This is a formatted custom success message")?;
        spinner.start()?;
        self.wait();
        let (spin, awesome) = ("Spinner", "Awesome");
        spinner.successf(format_args!("{spin} is {awesome}!"));

        let spinner = self.spinner("This is a formatted custom error message")?;
        spinner.start()?;
        self.wait();
        let secs = self.pause.as_secs();
        spinner.errorf(format_args!("I waited {secs} seconds to error!"));
        Ok(())
    }

    fn reuse(&self) -> Result<()> {
        let spinner = self.spinner("")?;
        spinner.start_with("Message is optional on creation")?;
        self.wait();
        spinner.success_with("Awesome! More flexibility!");

        spinner.start_with("Spinner reuse FTW!")?;
        self.wait();
        spinner.success();

        spinner.start_with("Step 1 of 2")?;
        self.wait();
        spinner.restart("Step 2 of 2")?;
        self.wait();
        spinner.success_with("Step 2 of 2 done");
        Ok(())
    }

    fn frames(&self) -> Result<()> {
        let spinner = self.spinner("Change spinners on the fly")?;
        spinner.start()?;
        self.wait();
        spinner.set_glyphs(["+", "x", "X", "x"])?;
        self.wait();
        spinner.set_glyphs(["\\", "|", "/", "-"])?;
        self.wait();
        spinner.set_glyphs(["-->  ", " --> ", "  -->"])?;
        self.wait();
        spinner.success();

        match Platform::current() {
            Platform::Windows => {
                spinner.set_glyphs(["^", ">", "v", "<"])?;
                spinner.set_success_symbol("+");
            }
            Platform::Unix => {
                spinner.set_glyphs(["🌕", "🌖", "🌗", "🌘", "🌑", "🌒", "🌓", "🌔"])?;
                spinner.set_success_symbol("👍");
            }
        }
        spinner.start_with("Custom spinner + success symbol!")?;
        self.wait();
        spinner.success();

        match Platform::current() {
            Platform::Windows => {
                spinner.set_glyphs([".", "o", "O", "@", "*"])?;
                spinner.set_error_symbol("!");
            }
            Platform::Unix => {
                spinner.set_glyphs([
                    "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚", "🕛",
                ])?;
                spinner.set_error_symbol("💩");
            }
        }
        spinner.start_with("Custom spinner + error symbol!")?;
        self.wait();
        spinner.error();
        Ok(())
    }

    fn speed(&self) -> Result<()> {
        let mut message = String::from("Change spinner timing on the fly: Normal");
        let spinner = self.spinner(&message)?;
        spinner.start()?;
        self.wait();

        for (label, ms) in [("Slow", 300), ("Normal", 100), ("Fast", 50)] {
            message.push(' ');
            message.push_str(label);
            spinner.set_interval_ms(ms);
            spinner.update_message(message.as_str());
            self.wait();
        }
        spinner.success_with(format!("{message}. Much Wow."));
        Ok(())
    }

    fn messages(&self) -> Result<()> {
        let step = self.pause / 2;
        let mut message = String::from("2");
        let spinner = self.spinner(&message)?;
        spinner.start()?;
        for part in [" 4", " 6", " 8"] {
            thread::sleep(step);
            message.push_str(part);
            spinner.update_message(message.as_str());
        }
        thread::sleep(step);
        spinner.update_message("Who do we appreciate?");
        thread::sleep(step);
        message.push_str(" Motorway!");
        spinner.success_with(message);
        Ok(())
    }

    fn misuse(&self) -> Result<()> {
        println!();
        println!("Stopping a spinner that is not running notes it in the final line.");
        println!("Every stop variant returns immediately.");
        println!();

        self.spinner("Test success()")?.success();
        self.spinner("Test error()")?.error();
        let spinner = self.spinner("Test custom messages")?;
        spinner.success_with("Test success_with()");
        spinner.error_with("Test error_with()");
        spinner.successf(format_args!("Test {}()", "successf"));
        spinner.errorf(format_args!("Test {}()", "errorf"));

        println!();
        println!("Starting a spinner twice gives up after a short wait.");
        println!();
        let spinner = self.spinner("Started once")?;
        spinner.start()?;
        if let Err(err) = spinner.start() {
            info!(%err, "second start refused");
        }
        Ok(())
    }

    fn interrupt(&self) -> Result<()> {
        println!();
        println!("Interrupt handling. Hit Ctrl-C to stop the bomb exploding!");
        println!();

        let spinner = self
            .options("💣 Tick...tick...tick...")
            .abort_message("Defused!")
            .build()
            .context("invalid spinner settings")?;
        spinner.start()?;
        thread::sleep(self.pause * 5 / 2);
        spinner.success_with("💥 Boom!");
        Ok(())
    }
}

const fn scenario_name(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::All => "all",
        Scenario::Outcomes => "outcomes",
        Scenario::Reuse => "reuse",
        Scenario::Frames => "frames",
        Scenario::Speed => "speed",
        Scenario::Messages => "messages",
        Scenario::Misuse => "misuse",
        Scenario::Interrupt => "interrupt",
    }
}

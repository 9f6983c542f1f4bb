use crate::browser::{PaymentBrowser, SystemBrowser};
use crate::callback::{observe, CallbackRouter, PaymentOutcome};
use crate::error::Result;
use crate::payment_link::{PaymentLink, DEMO_AMOUNT, DEMO_BASE_URL, DEMO_CURRENCY};
use std::io::{BufRead, Write};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
/// Pay through the Kryptonim hosted form
///
/// Builds links into the hosted payment form and reports the result the form
/// sends back through kryptonim-demo:// callback URLs.
pub struct Opts {
    /// Program used to open the payment page
    ///
    /// Defaults to `open` on macOS and `xdg-open` elsewhere.
    #[structopt(long, env = "KRYPTONIM_OPENER", global = true)]
    opener: Option<String>,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Print the payment page URL
    Link(LinkOpts),
    /// Open the payment page and wait for its callback
    ///
    /// Callback URLs delivered to the app are read from stdin, one per line.
    /// Prints SUCCESS or FAILURE once the payment page reports a result.
    Pay {
        #[structopt(flatten)]
        link: LinkOpts,
        /// Only print the URL, do not open a browser
        #[structopt(long)]
        no_browser: bool,
    },
    /// Deliver callback URLs as if the system had opened them
    ///
    /// Example: kryptonim-demo://kryptonim.purchase.success
    Callback {
        #[structopt(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Debug, StructOpt)]
struct LinkOpts {
    /// Address of the hosted payment form
    #[structopt(long, env = "KRYPTONIM_BASE_URL")]
    base_url: Option<String>,
    /// Amount to pay, as a decimal string
    ///
    /// Example: 0.5
    #[structopt(long)]
    amount: Option<String>,
    /// Currency code
    ///
    /// Example: USDC
    #[structopt(long)]
    currency: Option<String>,
    /// Fill in the demo amount and currency where not given
    #[structopt(long)]
    demo: bool,
}

impl Opts {
    pub fn browser(&self) -> SystemBrowser {
        match &self.opener {
            Some(opener) => SystemBrowser::with_opener(opener),
            None => SystemBrowser::new(),
        }
    }
}

pub fn run<R, W>(opts: &Opts, browser: &dyn PaymentBrowser, input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    match &opts.command {
        Command::Link(link) => {
            let url = opts_to_link(link)?.to_url();
            writeln!(output, "{}", url)?;
        }
        Command::Pay { link, no_browser } => {
            let url = opts_to_link(link)?.to_url();
            writeln!(output, "{}", url)?;
            if !*no_browser {
                browser.present(&url)?;
            }

            match wait_for_outcome(input)? {
                Some(outcome) => writeln!(output, "{}", outcome)?,
                None => tracing::warn!("input closed before the payment page reported back"),
            }
        }
        Command::Callback { urls } => {
            let (router, receiver) = CallbackRouter::channel();
            for url in urls {
                router.open_url_str(url);
            }
            let mut outcomes = vec![];
            observe(&receiver, |_, outcome| outcomes.push(outcome));
            print_outcomes(&mut output, &outcomes)?;
        }
    }

    Ok(())
}

fn opts_to_link(opts: &LinkOpts) -> Result<PaymentLink> {
    let base = opts.base_url.as_deref().unwrap_or(DEMO_BASE_URL);
    let mut link = PaymentLink::new(base)?;

    let (amount, currency) = if opts.demo {
        (
            opts.amount.as_deref().or(Some(DEMO_AMOUNT)),
            opts.currency.as_deref().or(Some(DEMO_CURRENCY)),
        )
    } else {
        (opts.amount.as_deref(), opts.currency.as_deref())
    };
    link.set_amount(amount);
    link.set_currency(currency);

    Ok(link)
}

/// Feeds each input line to the router until a success or failure arrives.
fn wait_for_outcome<R: BufRead>(input: R) -> Result<Option<PaymentOutcome>> {
    let (router, receiver) = CallbackRouter::channel();

    for line in input.lines() {
        router.open_url_str(&line?);

        let mut result = None;
        observe(&receiver, |_, outcome| {
            if outcome.is_final() && result.is_none() {
                result = Some(outcome);
            }
        });
        if result.is_some() {
            return Ok(result);
        }
    }

    Ok(None)
}

fn print_outcomes<W: Write>(output: &mut W, outcomes: &[PaymentOutcome]) -> Result<()> {
    for outcome in outcomes.iter().filter(|o| o.is_final()) {
        writeln!(output, "{}", outcome)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use url::Url;

    #[derive(Default)]
    struct RecordingBrowser {
        opened: RefCell<Vec<Url>>,
    }

    impl PaymentBrowser for RecordingBrowser {
        fn present(&self, url: &Url) -> Result<()> {
            self.opened.borrow_mut().push(url.clone());
            Ok(())
        }
    }

    fn run_args(args: &[&str], input: &str) -> (Result<()>, String, Vec<Url>) {
        let opts = Opts::from_iter_safe(args.iter().copied()).unwrap();
        let browser = RecordingBrowser::default();
        let mut output = vec![];
        let result = run(&opts, &browser, input.as_bytes(), &mut output);
        let opened = browser.opened.into_inner();
        (result, String::from_utf8(output).unwrap(), opened)
    }

    #[test]
    fn link_without_params_is_base() {
        let (result, output, _) = run_args(&["kryptonim-demo", "link"], "");
        assert!(result.is_ok());
        assert_eq!(output, "https://intg-kryptonim.devone.cc/iframe-form\n");
    }

    #[test]
    fn link_demo_fills_missing_values() {
        let (_, output, _) = run_args(&["kryptonim-demo", "link", "--demo", "--amount", "2"], "");
        assert_eq!(
            output,
            "https://intg-kryptonim.devone.cc/iframe-form?amount=2&currency=USDC\n"
        );
    }

    #[test]
    fn link_with_bad_base() {
        let (result, _, _) = run_args(&["kryptonim-demo", "link", "--base-url", "nope"], "");
        assert!(matches!(result, Err(Error::InvalidBaseUrl { .. })));
    }

    #[test]
    fn pay_opens_browser_and_waits_for_result() {
        let input = "https://unrelated.example/\n\
                     kryptonim-demo://kryptonim.purchase.pending\n\
                     kryptonim-demo://kryptonim.purchase.failure\n\
                     kryptonim-demo://kryptonim.purchase.success\n";
        let (result, output, opened) = run_args(
            &["kryptonim-demo", "pay", "--amount", "0.5", "--currency", "USDC"],
            input,
        );

        assert!(result.is_ok());
        assert_eq!(
            output,
            "https://intg-kryptonim.devone.cc/iframe-form?amount=0.5&currency=USDC\nFAILURE\n"
        );
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].query(), Some("amount=0.5&currency=USDC"));
    }

    #[test]
    fn pay_without_browser() {
        let (result, output, opened) = run_args(
            &["kryptonim-demo", "pay", "--no-browser"],
            "kryptonim-demo://kryptonim.purchase.success\n",
        );
        assert!(result.is_ok());
        assert!(opened.is_empty());
        assert!(output.ends_with("SUCCESS\n"));
    }

    #[test]
    fn pay_with_closed_input_prints_no_outcome() {
        let (result, output, _) = run_args(&["kryptonim-demo", "pay", "--no-browser"], "");
        assert!(result.is_ok());
        assert_eq!(output, "https://intg-kryptonim.devone.cc/iframe-form\n");
    }

    #[test]
    fn callback_prints_final_outcomes_only() {
        let (_, output, _) = run_args(
            &[
                "kryptonim-demo",
                "callback",
                "kryptonim-demo://kryptonim.purchase.success",
                "kryptonim-demo://somewhere.else",
                "mailto:someone@example.com",
                "kryptonim-demo://kryptonim.purchase.failure",
            ],
            "",
        );
        assert_eq!(output, "SUCCESS\nFAILURE\n");
    }
}

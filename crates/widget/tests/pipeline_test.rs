use std::cell::RefCell;
use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;
use std::time::Duration;

use asciimath_widget::testing::{Recorded, TestBed, failure, success};
use asciimath_widget::{
    DEBOUNCE_DELAY, LineEnding, Placeholders, ServiceError, ServiceResponse, Widget,
    WidgetConfig, WidgetControls, WidgetPhase, WidgetRegistry,
};
use insta::assert_snapshot;
use markup::{Element, MarkupNode};

/// A small stand-in for the ASCIIMath parser: letters, digits, `sqrt(...)` and operators.
fn parse(input: &str) -> MarkupNode {
    let mut style = Element::new("mstyle")
        .with_attribute("mathcolor", "")
        .with_attribute("displaystyle", "true");
    style.children = parse_row(&mut input.chars().peekable());
    Element::new("math").with_child(style).into()
}

fn parse_row(chars: &mut Peekable<Chars<'_>>) -> Vec<MarkupNode> {
    let mut row = Vec::new();
    while let Some(ch) = chars.next() {
        let element = match ch {
            ')' => break,
            's' if chars.clone().take(4).eq("qrt(".chars()) => {
                chars.nth(3);
                let mut inner = Element::new("mrow");
                inner.children = parse_row(chars);
                Element::new("msqrt").with_child(inner)
            }
            c if c.is_whitespace() => continue,
            c if c.is_ascii_alphabetic() => Element::new("mi").with_text(c),
            c if c.is_ascii_digit() => Element::new("mn").with_text(c),
            c => Element::new("mo").with_text(c),
        };
        row.push(element.into());
    }
    row
}

fn full_controls() -> WidgetControls {
    WidgetControls::new("in", "out", "preview", "validated")
        .with_preview_source("preview-source")
        .with_validated_source("validated-source")
}

fn setup_with(controls: WidgetControls, config: WidgetConfig) -> (TestBed, Widget) {
    let bed = TestBed::new();
    let widget = Widget::new(controls, Rc::new(config), bed.capabilities(parse));
    (bed, widget)
}

fn setup() -> (TestBed, Widget) {
    setup_with(full_controls(), WidgetConfig::default())
}

fn type_text(bed: &TestBed, widget: &Widget, text: &str) -> bool {
    bed.host.set_input("in", text);
    widget.handle_edit()
}

fn markup(text: &str) -> Recorded {
    Recorded::Markup(text.to_string())
}

fn text(text: &str) -> Recorded {
    Recorded::Text(text.to_string())
}

#[test]
fn square_root_round_trip() {
    let (bed, widget) = setup();
    assert!(type_text(&bed, &widget, "sqrt(2)"));
    assert_eq!(bed.host.container("validated"), Some(text("...")));
    assert_eq!(bed.host.container("preview"), None);

    bed.runtime.advance(DEBOUNCE_DELAY);
    let sent = bed.service.sent();
    assert_eq!(sent.len(), 1);
    assert_snapshot!(sent[0].as_str(), @r#"
<math xmlns="http://www.w3.org/1998/Math/MathML">
  <mstyle displaystyle="true">
    <msqrt>
      <mrow>
        <mn>2</mn>
      </mrow>
    </msqrt>
  </mstyle>
</math>
"#);
    assert_eq!(bed.host.container("preview"), Some(markup(&sent[0])));
    assert_eq!(bed.host.container("preview-source"), Some(text(&sent[0])));

    let pmath = "<math><msqrt><mn>2</mn></msqrt></math>";
    let cmath = "<math><apply><root/><cn>2</cn></apply></math>";
    for request in bed.service.take_requests() {
        request.respond(success(pmath, cmath));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(markup(pmath)));
    assert_eq!(bed.host.container("validated-source"), Some(text(cmath)));
    assert_eq!(widget.phase(), WidgetPhase::Idle);
}

#[test]
fn bursts_of_edits_send_one_request() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "x");
    bed.runtime.advance(Duration::from_millis(100));
    type_text(&bed, &widget, "x+");
    bed.runtime.advance(Duration::from_millis(100));
    type_text(&bed, &widget, "x+1");
    bed.runtime.advance(Duration::from_millis(499));
    assert!(bed.service.sent().is_empty());
    assert_eq!(bed.host.container("preview"), None);

    bed.runtime.advance(Duration::from_millis(1));
    let sent = bed.service.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("<mo>+</mo>"));
    assert!(sent[0].contains("<mn>1</mn>"));
}

#[test]
fn refresh_reads_the_latest_input() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "a");
    // Changed without an edit event reaching the widget.
    bed.host.set_input("in", "b");
    bed.runtime.advance(DEBOUNCE_DELAY);
    let sent = bed.service.sent();
    assert!(sent[0].contains("<mi>b</mi>"));
}

#[test]
fn older_response_arriving_late_is_discarded() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    type_text(&bed, &widget, "2");
    bed.runtime.advance(DEBOUNCE_DELAY);

    let [first, second] = <[_; 2]>::try_from(bed.service.take_requests()).unwrap();
    assert!(first.markup().contains("<mn>1</mn>"));
    assert!(second.markup().contains("<mn>2</mn>"));

    second.respond(success("<math><mn>2</mn></math>", "two"));
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(markup("<math><mn>2</mn></math>")));

    first.respond(success("<math><mn>1</mn></math>", "one"));
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(markup("<math><mn>2</mn></math>")));
    assert_eq!(bed.host.container("validated-source"), Some(text("two")));
}

#[test]
fn older_response_arriving_early_is_discarded() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    type_text(&bed, &widget, "2");
    bed.runtime.advance(DEBOUNCE_DELAY);

    let [first, second] = <[_; 2]>::try_from(bed.service.take_requests()).unwrap();
    first.respond(success("<math><mn>1</mn></math>", "one"));
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("...")));
    assert_eq!(widget.phase(), WidgetPhase::AwaitingResponse);

    second.respond(success("<math><mn>2</mn></math>", "two"));
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(markup("<math><mn>2</mn></math>")));
}

#[test]
fn response_applies_until_the_next_request_is_issued() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    type_text(&bed, &widget, "2");

    // No newer request exists until the timer fires, so this response is still current.
    for request in bed.service.take_requests() {
        request.respond(success("<math><mn>1</mn></math>", "one"));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(markup("<math><mn>1</mn></math>")));
    assert_eq!(widget.phase(), WidgetPhase::PendingDebounce);

    bed.runtime.advance(DEBOUNCE_DELAY);
    assert_eq!(bed.service.sent().len(), 2);
    assert_eq!(widget.phase(), WidgetPhase::AwaitingResponse);
}

#[test]
fn submit_does_not_wait_for_the_debounce() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "x");
    let submitted = widget.handle_submit();
    assert_snapshot!(submitted.as_str(), @r#"
<math xmlns="http://www.w3.org/1998/Math/MathML">
  <mstyle displaystyle="true">
    <mi>x</mi>
  </mstyle>
</math>
"#);
    assert_eq!(bed.host.field("out"), Some(submitted));
    assert!(bed.service.sent().is_empty());
    assert_eq!(bed.host.container("preview"), None);

    // The pending refresh still runs afterwards.
    assert_eq!(widget.phase(), WidgetPhase::PendingDebounce);
    bed.runtime.advance(DEBOUNCE_DELAY);
    assert_eq!(bed.service.sent().len(), 1);
}

#[test]
fn submit_ignores_outstanding_validation() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "y");
    bed.runtime.advance(DEBOUNCE_DELAY);
    type_text(&bed, &widget, "z");
    let submitted = widget.handle_submit();
    assert!(submitted.contains("<mi>z</mi>"));
    assert_eq!(bed.host.field("out").as_deref(), Some(submitted.as_str()));
}

#[test]
fn initialize_renders_without_delay() {
    let (bed, widget) = setup();
    bed.host.set_input("in", "sqrt(2)");
    widget.initialize();

    assert_eq!(bed.runtime.now(), Duration::ZERO);
    let sent = bed.service.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(bed.host.container("preview"), Some(markup(&sent[0])));
    assert_eq!(bed.host.container("validated"), Some(text("...")));
    assert_eq!(widget.phase(), WidgetPhase::AwaitingResponse);

    // The initial text counts as seen.
    assert!(!widget.handle_edit());
}

#[test]
fn initialize_with_empty_input() {
    let (bed, widget) = setup();
    widget.initialize();
    let sent = bed.service.sent();
    assert_snapshot!(sent[0].as_str(), @r#"
<math xmlns="http://www.w3.org/1998/Math/MathML">
  <mstyle displaystyle="true">
  </mstyle>
</math>
"#);
    assert!(type_text(&bed, &widget, "a"));
}

#[test]
fn failure_shows_placeholder_and_clears_source() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond(success("<math><mn>1</mn></math>", "<cn>1</cn>"));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated-source"), Some(text("<cn>1</cn>")));

    type_text(&bed, &widget, "1+");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond(failure("Missing operand"));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("?")));
    assert_eq!(bed.host.container("validated-source"), Some(Recorded::Empty));
}

#[test]
fn content_mathml_without_markup_is_unexpected() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond_json(r#"{ "cmath": "<cn>1</cn>" }"#);
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("UNEXPECTED ERROR")));
    assert_eq!(bed.host.container("validated-source"), Some(Recorded::Empty));
}

#[test]
fn failed_up_conversion_is_unexpected() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "x");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond(success("<math><mi>x</mi></math>", "<math><ci>x</ci></math>"));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated-source"), Some(text("<math><ci>x</ci></math>")));

    type_text(&bed, &widget, "x+");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond_json(
            r#"{
                "asciiMathML": "<math><mi>x</mi><mo>+</mo></math>",
                "pmath": "<math><mi>x</mi><mo>+</mo></math>",
                "pmathBracketed": "<math><mrow><mi>x</mi><mo>+</mo></mrow></math>",
                "cmathFailures": "<s:fail code=\"UCFOP\" message=\"Operator + has no operand\"/>"
            }"#,
        );
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("UNEXPECTED ERROR")));
    assert_eq!(bed.host.container("validated-source"), Some(Recorded::Empty));
    assert_eq!(widget.phase(), WidgetPhase::Idle);
}

#[test]
fn empty_response_is_unexpected() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond(ServiceResponse::default());
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("UNEXPECTED ERROR")));
}

#[test]
fn transport_errors_are_unexpected() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.fail(ServiceError::Status(503));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("UNEXPECTED ERROR")));
    assert_eq!(widget.phase(), WidgetPhase::Idle);
}

#[test]
fn lost_requests_are_unexpected() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    drop(bed.service.take_requests());
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("UNEXPECTED ERROR")));
}

#[test]
fn malformed_json_is_unexpected() {
    let (bed, widget) = setup();
    type_text(&bed, &widget, "1");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond_json("<html>Internal Server Error</html>");
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("UNEXPECTED ERROR")));
}

#[test]
fn absent_source_containers_are_left_alone() {
    let controls = WidgetControls::new("in", "out", "preview", "validated");
    let (bed, widget) = setup_with(controls, WidgetConfig::default());
    type_text(&bed, &widget, "x");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.respond(success("<math><mi>x</mi></math>", "<ci>x</ci>"));
    }
    bed.runtime.run_until_stalled();

    let touched: Vec<_> = bed.host.writes().into_iter().map(|(id, _)| id).collect();
    assert_eq!(touched, ["validated", "preview", "validated"]);
}

#[test]
fn configured_placeholders_and_line_ending() {
    let config = WidgetConfig {
        line_ending: LineEnding::CrLf,
        placeholders: Placeholders {
            pending: "checking".to_string(),
            failure: "invalid".to_string(),
            unexpected: "service unavailable".to_string(),
        },
        ..Default::default()
    };
    let (bed, widget) = setup_with(full_controls(), config);
    type_text(&bed, &widget, "x");
    assert_eq!(bed.host.container("validated"), Some(text("checking")));

    bed.runtime.advance(DEBOUNCE_DELAY);
    let sent = bed.service.sent();
    assert_eq!(sent[0].matches("\r\n").count(), 4);
    assert!(!sent[0].replace("\r\n", "").contains('\n'));

    for request in bed.service.take_requests() {
        request.respond(failure("bad"));
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("invalid")));

    type_text(&bed, &widget, "xy");
    bed.runtime.advance(DEBOUNCE_DELAY);
    for request in bed.service.take_requests() {
        request.fail(ServiceError::Dropped);
    }
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("validated"), Some(text("service unavailable")));
}

#[test]
fn backticks_are_escaped_before_parsing() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let parser = {
        let seen = Rc::clone(&seen);
        move |input: &str| {
            seen.borrow_mut().push(input.to_string());
            parse(input)
        }
    };
    let bed = TestBed::new();
    let widget = Widget::new(
        WidgetControls::new("in", "out", "preview", "validated"),
        Rc::new(WidgetConfig::default()),
        bed.capabilities(parser),
    );
    bed.host.set_input("in", "`a`");
    widget.handle_submit();
    assert_eq!(*seen.borrow(), ["\\`a\\`"]);
}

#[test]
fn registry_keeps_widgets_apart() {
    let bed = TestBed::new();
    bed.host.set_input("a", "1");
    bed.host.set_input("b", "2");
    let mut registry = WidgetRegistry::new(WidgetConfig::default(), bed.capabilities(parse));
    registry
        .register(WidgetControls::new("a", "a-out", "a-preview", "a-validated"))
        .unwrap();
    registry
        .register(WidgetControls::new("b", "b-out", "b-preview", "b-validated"))
        .unwrap();

    // Answering widget `b` does not count as a stale answer for widget `a`.
    let [for_a, for_b] = <[_; 2]>::try_from(bed.service.take_requests()).unwrap();
    for_b.respond(success("<math><mn>2</mn></math>", ""));
    for_a.respond(success("<math><mn>1</mn></math>", ""));
    bed.runtime.run_until_stalled();
    assert_eq!(bed.host.container("a-validated"), Some(markup("<math><mn>1</mn></math>")));
    assert_eq!(bed.host.container("b-validated"), Some(markup("<math><mn>2</mn></math>")));

    bed.host.set_input("a", "3");
    assert!(registry.handle_edit("a"));
    assert!(!registry.handle_edit("b"));
    let submitted = registry.handle_submit("b").unwrap();
    assert_eq!(bed.host.field("b-out"), Some(submitted));
    assert_eq!(bed.host.field("a-out"), None);
}

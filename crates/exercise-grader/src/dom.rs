//! Browser binding: builds exercises from page markup and keeps the DOM in
//! sync with them.
//!
//! Exercise models live in a thread-local registry keyed by
//! `data-exercise-id`, created on first interaction. Every operation reads
//! current control values into the model, runs, then renders the model back.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent};

use crate::answer::{first_alternative, is_correct};
use crate::error::GraderError;
use crate::exercise::{Exercise, ExerciseBody, ExerciseKind};
use crate::fields::{content_width, BlankFocus, Field, FieldSet};
use crate::matching::{ClickOutcome, MatchBoard, MatchItem, MISMATCH_CLEAR_DELAY_MS};
use crate::score::ScoreDisplay;

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

const CARD: &str = ".eng-exercise-card";
const BODY: &str = ".eng-exercise-body";
const BLANK: &str = ".eng-blank";
const DROPDOWN: &str = ".eng-dropdown";
const MATCH_ITEM: &str = ".eng-match-item";
const PROMPT_CLASS: &str = "eng-prompt";
const MATCHES_LIST: &str = ".eng-matches-list";
const WORD: &str = ".eng-word";
const SCORE: &str = ".eng-score-display";
const ACTION: &str = "[data-action]";

thread_local! {
    static EXERCISES: RefCell<HashMap<String, Exercise>> = RefCell::new(HashMap::new());
    static LAST_BLANK: RefCell<BlankFocus<Element>> = const { RefCell::new(BlankFocus::new()) };
}

fn log_error(err: &GraderError) {
    web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
}

fn js_error(value: JsValue) -> GraderError {
    GraderError::Environment(format!("{:?}", value))
}

fn document() -> Result<Document, GraderError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| GraderError::Environment("no document".to_string()))
}

fn select_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn set_class(el: &Element, class: &str, on: bool) -> Result<(), GraderError> {
    el.class_list()
        .toggle_with_force(class, on)
        .map(|_| ())
        .map_err(js_error)
}

fn text_of(el: &Element) -> String {
    el.text_content().unwrap_or_default().trim().to_string()
}

fn card_of(el: &Element) -> Result<Element, GraderError> {
    el.closest(CARD)
        .map_err(js_error)?
        .ok_or(GraderError::NoExercise)
}

fn exercise_id(card: &Element) -> Result<String, GraderError> {
    card.get_attribute("data-exercise-id")
        .ok_or(GraderError::MissingAttribute("data-exercise-id"))
}

// ============================================================================
// Markup -> model
// ============================================================================

/// Declared blank length, falling back to the length of the first answer.
fn min_length(control: &Element) -> u32 {
    control
        .get_attribute("data-length")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| {
            let answer = control.get_attribute("data-answer").unwrap_or_default();
            first_alternative(&answer).chars().count() as u32
        })
}

fn control_value(control: &Element) -> String {
    if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else {
        text_of(control)
    }
}

fn read_fields(card: &Element, selector: &str) -> Result<FieldSet, GraderError> {
    let fields = select_all(card, selector)
        .iter()
        .map(|control| {
            let answer = control
                .get_attribute("data-answer")
                .ok_or(GraderError::MissingAttribute("data-answer"))?;
            Ok(Field::new(answer, min_length(control)))
        })
        .collect::<Result<Vec<_>, GraderError>>()?;
    Ok(FieldSet::new(fields))
}

fn read_board(card: &Element) -> Result<MatchBoard, GraderError> {
    let items = select_all(card, MATCH_ITEM)
        .iter()
        .map(|el| {
            let text = text_of(el);
            if el.class_list().contains(PROMPT_CLASS) {
                let answer = el
                    .get_attribute("data-answer")
                    .ok_or(GraderError::MissingAttribute("data-answer"))?;
                Ok(MatchItem::prompt(text, answer.trim()))
            } else {
                Ok(MatchItem::target(text))
            }
        })
        .collect::<Result<Vec<_>, GraderError>>()?;
    Ok(MatchBoard::new(items))
}

fn build_exercise(card: &Element, id: &str) -> Result<Exercise, GraderError> {
    let kind: ExerciseKind = card
        .get_attribute("data-kind")
        .ok_or(GraderError::MissingAttribute("data-kind"))?
        .parse()?;

    let body = match kind {
        ExerciseKind::FillBlank => ExerciseBody::FillBlank(read_fields(card, BLANK)?),
        ExerciseKind::Dropdown => ExerciseBody::Dropdown(read_fields(card, DROPDOWN)?),
        ExerciseKind::Matching => ExerciseBody::Matching(read_board(card)?),
    };
    Ok(Exercise::new(id, body))
}

fn sync_from_dom(exercise: &mut Exercise, card: &Element) {
    let (fields, selector) = match &mut exercise.body {
        ExerciseBody::FillBlank(fields) => (fields, BLANK),
        ExerciseBody::Dropdown(fields) => (fields, DROPDOWN),
        ExerciseBody::Matching(_) => return,
    };
    for (i, control) in select_all(card, selector).iter().enumerate() {
        fields.set_value(i, control_value(control));
    }
}

// ============================================================================
// Model -> markup
// ============================================================================

fn render_fields(card: &Element, selector: &str, fields: &FieldSet) -> Result<(), GraderError> {
    for (control, field) in select_all(card, selector).iter().zip(fields.fields()) {
        if let Some(input) = control.dyn_ref::<HtmlInputElement>() {
            if input.value() != field.user_value {
                input.set_value(&field.user_value);
            }
            input
                .style()
                .set_property("width", &format!("{}px", field.width()))
                .map_err(js_error)?;
        } else if let Some(select) = control.dyn_ref::<HtmlSelectElement>() {
            if field.user_value.is_empty() {
                select.set_selected_index(0);
            } else {
                select.set_value(&field.user_value);
            }
        }

        let grade = field.grade().css_class();
        set_class(control, "correct", grade == Some("correct"))?;
        set_class(control, "incorrect", grade == Some("incorrect"))?;
    }
    Ok(())
}

fn render_board(card: &Element, board: &MatchBoard) -> Result<(), GraderError> {
    for (el, item) in select_all(card, MATCH_ITEM).iter().zip(board.items()) {
        let state = item.state().css_class();
        for class in ["selected", "matched", "incorrect"] {
            set_class(el, class, state == Some(class))?;
        }
    }

    let Some(list) = card.query_selector(MATCHES_LIST).map_err(js_error)? else {
        return Ok(());
    };
    list.set_text_content(None);

    let document = document()?;
    for record in board.records() {
        let pair = document.create_element("div").map_err(js_error)?;
        let outcome = if record.correct { "correct" } else { "incorrect" };
        pair.set_class_name(&format!("eng-match-pair {}", outcome));

        let mark = if record.correct { "✓" } else { "✗" };
        for (class, text) in [
            ("eng-match-prompt", record.prompt.as_str()),
            ("eng-match-arrow", "→"),
            ("eng-match-target", record.target.as_str()),
            ("eng-match-mark", mark),
        ] {
            let span = document.create_element("span").map_err(js_error)?;
            span.set_class_name(class);
            span.set_text_content(Some(text));
            pair.append_child(&span).map_err(js_error)?;
        }
        list.append_child(&pair).map_err(js_error)?;
    }
    Ok(())
}

fn render_score(card: &Element, score: &ScoreDisplay) -> Result<(), GraderError> {
    if let Some(display) = card.query_selector(SCORE).map_err(js_error)? {
        display.set_class_name(&score.css_class());
        display.set_text_content(Some(score.message()));
    }
    Ok(())
}

fn render(exercise: &Exercise, card: &Element) -> Result<(), GraderError> {
    match &exercise.body {
        ExerciseBody::FillBlank(fields) => render_fields(card, BLANK, fields)?,
        ExerciseBody::Dropdown(fields) => render_fields(card, DROPDOWN, fields)?,
        ExerciseBody::Matching(board) => render_board(card, board)?,
    }
    render_score(card, exercise.score())?;

    if let Some(body) = card.query_selector(BODY).map_err(js_error)? {
        set_class(&body, "hidden", !exercise.is_visible())?;
    }
    Ok(())
}

/// Run `op` on the card's exercise, creating it on first use, then re-render.
fn with_exercise<R>(
    card: &Element,
    op: impl FnOnce(&mut Exercise) -> R,
) -> Result<R, GraderError> {
    let id = exercise_id(card)?;

    EXERCISES.with(|registry| {
        let mut registry = registry.borrow_mut();
        let exercise = match registry.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let exercise = build_exercise(card, entry.key())?;
                entry.insert(exercise)
            }
        };

        sync_from_dom(exercise, card);
        let result = op(exercise);
        render(exercise, card)?;
        Ok(result)
    })
}

// ============================================================================
// Event handling
// ============================================================================

fn schedule_clear(card: Element, ticket: u64) -> Result<(), GraderError> {
    let window = web_sys::window().ok_or_else(|| GraderError::Environment("no window".to_string()))?;

    let callback: js_sys::Function = Closure::once_into_js(move || {
        let applied = with_exercise(&card, |exercise| match &mut exercise.body {
            ExerciseBody::Matching(board) => board.apply_clear(ticket),
            _ => false,
        });
        if let Err(e) = applied {
            log_error(&e);
        }
    })
    .unchecked_into();

    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            &callback,
            MISMATCH_CLEAR_DELAY_MS as i32,
        )
        .map_err(js_error)?;
    Ok(())
}

fn handle_match_click(item: &Element) -> Result<(), GraderError> {
    let card = card_of(item)?;
    let Some(id) = select_all(&card, MATCH_ITEM).iter().position(|el| el == item) else {
        return Ok(());
    };

    let outcome = with_exercise(&card, |exercise| match &mut exercise.body {
        ExerciseBody::Matching(board) => board.click(id),
        _ => ClickOutcome::Ignored,
    })?;

    if let ClickOutcome::Mismatched { clear } = outcome {
        schedule_clear(card, clear.ticket)?;
    }
    Ok(())
}

fn handle_word_click(word: &Element) -> Result<(), GraderError> {
    let card = card_of(word)?;
    let text = text_of(word);
    let blanks = select_all(&card, BLANK);
    let focused = LAST_BLANK.with(|last| {
        let last = last.borrow();
        let last = last.last()?;
        blanks.iter().position(|b| b == last)
    });

    let placed = with_exercise(&card, |exercise| match &mut exercise.body {
        ExerciseBody::FillBlank(fields) => fields.place_word(&text, focused),
        _ => None,
    })?;

    if let Some(blank) = placed.and_then(|i| blanks.get(i)) {
        if let Some(el) = blank.dyn_ref::<HtmlElement>() {
            el.focus().map_err(js_error)?;
        }
    }
    Ok(())
}

fn handle_blank_input(blank: &Element) -> Result<(), GraderError> {
    if let Some(input) = blank.dyn_ref::<HtmlInputElement>() {
        let width = content_width(min_length(blank), &input.value());
        input
            .style()
            .set_property("width", &format!("{}px", width))
            .map_err(js_error)?;
    }
    Ok(())
}

fn handle_blank_enter(blank: &Element, event: &KeyboardEvent) -> Result<(), GraderError> {
    let card = card_of(blank)?;
    let blanks = select_all(&card, BLANK);
    let Some(current) = blanks.iter().position(|b| b == blank) else {
        return Ok(());
    };

    let next = with_exercise(&card, |exercise| match &exercise.body {
        ExerciseBody::FillBlank(fields) => fields.next_field(current),
        _ => None,
    })?;

    if let Some(el) = next.and_then(|i| blanks.get(i)).and_then(|b| b.dyn_ref::<HtmlElement>()) {
        event.prevent_default();
        el.focus().map_err(js_error)?;
    }
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn dispatch_action(button: &Element) -> Result<(), GraderError> {
    let action = button.get_attribute("data-action").unwrap_or_default();
    let op: fn(&mut Exercise) = match action.as_str() {
        "check" => |ex| {
            ex.check();
        },
        "reveal" => |ex| {
            ex.reveal();
        },
        "reset" => |ex| {
            ex.reset();
        },
        "toggle" => |ex| {
            ex.toggle_visibility();
        },
        _ => return Ok(()),
    };
    run(button, op).map(|_| ())
}

fn on_click(event: Event) {
    let Some(target) = event_element(&event) else {
        return;
    };

    let result = if let Ok(Some(button)) = target.closest(ACTION) {
        dispatch_action(&button)
    } else if let Ok(Some(item)) = target.closest(MATCH_ITEM) {
        handle_match_click(&item)
    } else if target.matches(WORD).unwrap_or(false) {
        handle_word_click(&target)
    } else {
        Ok(())
    };

    if let Err(e) = result {
        log_error(&e);
    }
}

fn on_input(event: Event) {
    if let Some(target) = event_element(&event) {
        if target.matches(BLANK).unwrap_or(false) {
            if let Err(e) = handle_blank_input(&target) {
                log_error(&e);
            }
        }
    }
}

fn on_focusin(event: Event) {
    if let Some(target) = event_element(&event) {
        LAST_BLANK.with(|last| {
            let mut last = last.borrow_mut();
            if target.matches(BLANK).unwrap_or(false) {
                last.focus_blank(target);
            } else {
                last.focus_other();
            }
        });
    }
}

fn on_keydown(event: KeyboardEvent) {
    if event.key() != "Enter" {
        return;
    }
    if let Some(target) = event_element(&event) {
        if target.matches(BLANK).unwrap_or(false) {
            if let Err(e) = handle_blank_enter(&target, &event) {
                log_error(&e);
            }
        }
    }
}

fn install_listeners(document: &Document) -> Result<(), GraderError> {
    let click = Closure::<dyn FnMut(Event)>::new(on_click);
    document
        .add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
        .map_err(js_error)?;
    click.forget();

    let input = Closure::<dyn FnMut(Event)>::new(on_input);
    document
        .add_event_listener_with_callback("input", input.as_ref().unchecked_ref())
        .map_err(js_error)?;
    input.forget();

    let focusin = Closure::<dyn FnMut(Event)>::new(on_focusin);
    document
        .add_event_listener_with_callback("focusin", focusin.as_ref().unchecked_ref())
        .map_err(js_error)?;
    focusin.forget();

    let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(on_keydown);
    document
        .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
        .map_err(js_error)?;
    keydown.forget();

    Ok(())
}

fn size_blanks(document: &Document) -> Result<(), GraderError> {
    let Some(root) = document.document_element() else {
        return Ok(());
    };
    for blank in select_all(&root, BLANK) {
        handle_blank_input(&blank)?;
    }
    Ok(())
}

// ============================================================================
// WASM Exports
// ============================================================================

fn run(el: &Element, op: impl FnOnce(&mut Exercise)) -> Result<String, GraderError> {
    let card = card_of(el)?;
    with_exercise(&card, |exercise| {
        op(exercise);
        serde_json::to_string(&exercise.summary()).unwrap_or_default()
    })
}

fn respond(result: Result<String, GraderError>) -> String {
    match result {
        Ok(json) => json,
        Err(e) => {
            log_error(&e);
            serde_json::json!({ "error": e.to_string() }).to_string()
        }
    }
}

/// Install page listeners and size blanks.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    let result = document().and_then(|document| {
        install_listeners(&document)?;
        size_blanks(&document)
    });
    if let Err(e) = result {
        log_error(&e);
    }
}

/// Grade the exercise owning `el`.
///
/// Returns JSON: {"id", "kind", "visible", "score": {"status", ...}}
#[wasm_bindgen]
pub fn check(el: &Element) -> String {
    respond(run(el, |ex| {
        ex.check();
    }))
}

/// Reveal all answers of the exercise owning `el`.
#[wasm_bindgen]
pub fn reveal(el: &Element) -> String {
    respond(run(el, |ex| {
        ex.reveal();
    }))
}

/// Reset the exercise owning `el`.
#[wasm_bindgen]
pub fn reset(el: &Element) -> String {
    respond(run(el, |ex| {
        ex.reset();
    }))
}

/// Show or hide the body of the exercise owning `el`.
#[wasm_bindgen(js_name = toggleVisibility)]
pub fn toggle_visibility(el: &Element) -> String {
    respond(run(el, |ex| {
        ex.toggle_visibility();
    }))
}

#[wasm_bindgen(js_name = isAnswerCorrect)]
pub fn is_answer_correct(user_answer: &str, answer_key: &str) -> bool {
    is_correct(user_answer, answer_key)
}

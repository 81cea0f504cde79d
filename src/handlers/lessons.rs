//! Lesson pages: every exercise of a lesson rendered as an exercise card.
//!
//! The markup carries everything the browser-side grader needs
//! (`data-kind`, `data-answer`, `data-length`, role classes); grading never
//! round-trips to the server.

use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use exercise_grader::fields::default_width;
use exercise_grader::ExerciseKind;
use rand::seq::SliceRandom;

use crate::content::{split_sentence, ExerciseDef, Lesson, Segment, SentenceDef};
use crate::filters;
use crate::state::AppState;

/// A blank or dropdown inside a sentence.
pub struct BlankView {
  pub answer: String,
  pub length: u32,
  /// Initial width in pixels, before the grader takes over sizing
  pub width: u32,
  pub options: Vec<String>,
}

/// Literal text, or a blank.
pub struct SegmentView {
  pub text: String,
  pub blank: Option<BlankView>,
}

pub struct SentenceView {
  pub segments: Vec<SegmentView>,
}

pub struct PromptView {
  pub text: String,
  pub answer: String,
}

/// One exercise card.
pub struct ExerciseView {
  /// Unique on the page; the grader keys its state by this
  pub dom_id: String,
  pub kind: &'static str,
  pub number: usize,
  pub title: String,
  pub instructions: Option<String>,
  pub is_dropdown: bool,
  pub is_matching: bool,
  pub sentences: Vec<SentenceView>,
  pub word_bank: Vec<String>,
  pub prompts: Vec<PromptView>,
  pub targets: Vec<String>,
}

#[derive(Template)]
#[template(path = "lesson.html")]
pub struct LessonTemplate {
  pub number: u8,
  pub title: String,
  pub description: Option<String>,
  pub exercises: Vec<ExerciseView>,
  pub prev: Option<u8>,
  pub next: Option<u8>,
}

fn sentence_view(sentence: &SentenceDef) -> SentenceView {
  let segments = split_sentence(&sentence.text)
    .into_iter()
    .map(|segment| match segment {
      Segment::Text(text) => SegmentView { text, blank: None },
      Segment::Blank(position) => {
        let blank = sentence.blanks.iter().find(|b| b.position == position).map(|b| {
          let length = b.display_length();
          BlankView {
            answer: b.answer.clone(),
            length,
            width: default_width(length),
            options: b.options.iter().map(|o| o.trim().to_string()).collect(),
          }
        });
        SegmentView {
          text: String::new(),
          blank,
        }
      }
    })
    .collect();

  SentenceView { segments }
}

/// Build the card for one exercise. Matching targets are shuffled.
pub fn exercise_view(lesson: u8, index: usize, ex: &ExerciseDef) -> ExerciseView {
  let mut targets: Vec<String> = ex
    .pairs
    .iter()
    .map(|p| p.answer.trim().to_string())
    .chain(ex.distractors.iter().map(|d| d.trim().to_string()))
    .collect();
  targets.shuffle(&mut rand::rng());

  ExerciseView {
    dom_id: format!("lesson{}-{}", lesson, ex.id),
    kind: ex.kind.as_str(),
    number: index + 1,
    title: ex.title.clone(),
    instructions: ex.instructions.clone(),
    is_dropdown: ex.kind == ExerciseKind::Dropdown,
    is_matching: ex.kind == ExerciseKind::Matching,
    sentences: ex.sentences.iter().map(sentence_view).collect(),
    word_bank: match ex.kind {
      ExerciseKind::FillBlank => ex.word_bank.clone(),
      _ => Vec::new(),
    },
    prompts: ex
      .pairs
      .iter()
      .map(|p| PromptView {
        text: p.prompt.trim().to_string(),
        answer: p.answer.trim().to_string(),
      })
      .collect(),
    targets,
  }
}

fn neighbours(lessons: &[Lesson], number: u8) -> (Option<u8>, Option<u8>) {
  let Some(pos) = lessons.iter().position(|l| l.lesson == number) else {
    return (None, None);
  };
  let prev = pos.checked_sub(1).map(|i| lessons[i].lesson);
  let next = lessons.get(pos + 1).map(|l| l.lesson);
  (prev, next)
}

fn not_found(requested: &str) -> Response {
  let body = format!(
    r#"<h1>Lesson not found</h1><p>There is no lesson "{}".</p><p><a href="/">Back to lessons</a></p>"#,
    html_escape::encode_text(requested)
  );
  (StatusCode::NOT_FOUND, Html(body)).into_response()
}

/// Render all exercises of a lesson.
pub async fn lesson_page(State(state): State<AppState>, Path(number): Path<String>) -> Response {
  let Some(lesson) = number.parse::<u8>().ok().and_then(|n| state.library.get(n)) else {
    tracing::debug!("Unknown lesson requested: {}", number);
    return not_found(&number);
  };

  let (prev, next) = neighbours(&state.library.lessons, lesson.lesson);
  let template = LessonTemplate {
    number: lesson.lesson,
    title: lesson.title.clone(),
    description: lesson.description.clone(),
    exercises: lesson
      .exercises
      .iter()
      .enumerate()
      .map(|(i, ex)| exercise_view(lesson.lesson, i, ex))
      .collect(),
    prev,
    next,
  };

  match template.render() {
    Ok(html) => Html(html).into_response(),
    Err(e) => {
      tracing::error!("Failed to render lesson {}: {}", lesson.lesson, e);
      (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Error rendering lesson</h1>".to_string()))
        .into_response()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::{BlankDef, PairDef};

  fn blank(position: u8, answer: &str) -> BlankDef {
    BlankDef {
      position,
      answer: answer.to_string(),
      length: None,
      options: vec![],
    }
  }

  fn exercise(kind: ExerciseKind) -> ExerciseDef {
    ExerciseDef {
      id: "ex-1".into(),
      kind,
      title: "Test".into(),
      instructions: None,
      sentences: vec![SentenceDef {
        text: "She ___1 a sandwich and ___2 tea.".into(),
        blanks: vec![blank(1, "ate/had"), blank(2, "drank")],
      }],
      word_bank: vec!["ate".into(), "drank".into()],
      pairs: vec![
        PairDef {
          prompt: "go".into(),
          answer: "went".into(),
        },
        PairDef {
          prompt: "eat".into(),
          answer: "ate".into(),
        },
      ],
      distractors: vec!["goed".into()],
    }
  }

  #[test]
  fn test_sentence_segments() {
    let view = exercise_view(1, 0, &exercise(ExerciseKind::FillBlank));
    let segments = &view.sentences[0].segments;

    assert_eq!(segments.len(), 5);
    assert_eq!(segments[0].text, "She ");
    let first = segments[1].blank.as_ref().unwrap();
    assert_eq!(first.answer, "ate/had");
    assert_eq!(first.length, 3);
    assert_eq!(first.width, 50);
    assert!(segments[2].blank.is_none());
  }

  #[test]
  fn test_huge_blank_length_does_not_overflow() {
    let mut ex = exercise(ExerciseKind::FillBlank);
    ex.sentences[0].blanks[0].length = Some(u32::MAX);

    let view = exercise_view(1, 0, &ex);
    let blank = view.sentences[0].segments[1].blank.as_ref().unwrap();
    assert_eq!(blank.length, u32::MAX);
    assert_eq!(blank.width, u32::MAX);
  }

  #[test]
  fn test_view_ids_and_kind() {
    let view = exercise_view(3, 1, &exercise(ExerciseKind::Dropdown));
    assert_eq!(view.dom_id, "lesson3-ex-1");
    assert_eq!(view.kind, "dropdown");
    assert_eq!(view.number, 2);
    assert!(view.is_dropdown);
    assert!(view.word_bank.is_empty());
  }

  #[test]
  fn test_targets_include_answers_and_distractors() {
    let view = exercise_view(1, 0, &exercise(ExerciseKind::Matching));
    let mut targets = view.targets.clone();
    targets.sort();

    assert_eq!(targets, vec!["ate", "goed", "went"]);
    assert_eq!(view.prompts[0].answer, "went");
  }

  #[test]
  fn test_neighbours() {
    let lesson = |n: u8| Lesson {
      lesson: n,
      title: format!("L{}", n),
      description: None,
      exercises: vec![],
    };
    let lessons = vec![lesson(1), lesson(2), lesson(5)];

    assert_eq!(neighbours(&lessons, 1), (None, Some(2)));
    assert_eq!(neighbours(&lessons, 2), (Some(1), Some(5)));
    assert_eq!(neighbours(&lessons, 5), (Some(2), None));
    assert_eq!(neighbours(&lessons, 9), (None, None));
  }
}

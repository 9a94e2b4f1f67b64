// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{sync::Arc, time::Duration};

use classdesk_core::{CollectionItem, ContentKind, LessonContent, QuizReference};
use classdesk_core_api::{FIRST_PAGE, PageSize};
use classdesk_usecases::memory::Catalog;
use tokio::{runtime::Handle, time::sleep};

use crate::{
    editor::{EditorPolicy, ListEditor},
    testing::{TestBackend, file, quiz_catalog, settle},
};

use super::{selection::SelectionMap, *};

fn page(number: u32) -> PageNumber {
    PageNumber::new(number).unwrap()
}

fn ids(items: &[ResourceReference]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

fn open_quiz_picker(
    backend: &Arc<TestBackend>,
    mode: SelectionMode,
) -> (PickerSession<TestBackend>, PendingOutcome) {
    PickerSession::open(
        Handle::current(),
        Arc::clone(backend),
        &PickerConfig::default(),
        OpenRequest::new(ResourceKind::Quiz, mode),
    )
}

#[tokio::test(start_paused = true)]
async fn load_first_page_on_open() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(25)));
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    // Pending immediately
    assert!(!session.state().read().fetch().is_idle());
    assert_eq!(None, session.state().read().empty_state_message());
    settle().await;
    let state = session.state().read();
    assert_eq!(Some(FIRST_PAGE), state.current_page());
    assert_eq!(Some(3), state.total_pages());
    assert_eq!(10, state.items().len());
    assert_eq!("q1", state.items()[0].id);
    assert_eq!(None, state.empty_state_message());
    assert_eq!(vec![String::new()], backend.search_texts());
}

#[tokio::test(start_paused = true)]
async fn debounce_search_text_input() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(25)));
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    settle().await;
    assert_eq!(1, backend.page_requests().len());

    session.input_search_text("c");
    sleep(Duration::from_millis(100)).await;
    session.input_search_text("ca");
    sleep(Duration::from_millis(100)).await;
    session.input_search_text("cat");
    assert_eq!("cat", session.state().read().search_text_input());

    sleep(Duration::from_millis(250)).await;
    assert_eq!(1, backend.page_requests().len());
    assert_eq!("", session.state().read().context().params.search_text);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(vec![String::new(), "cat".to_owned()], backend.search_texts());
    let state = session.state().read();
    assert_eq!("cat", state.context().params.search_text);
    assert_eq!(Some(FIRST_PAGE), state.current_page());
    assert_eq!(Some(EMPTY_STATE_MESSAGE), state.empty_state_message());
}

#[tokio::test(start_paused = true)]
async fn unchanged_search_text_is_not_reloaded() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(5)));
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    settle().await;
    session.input_search_text("Quiz 2 ");
    session.input_search_text(" ");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(1, backend.page_requests().len());

    session.input_search_text(" Quiz 2 ");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        vec![String::new(), "Quiz 2".to_owned()],
        backend.search_texts()
    );
    assert_eq!(vec!["q2"], ids(session.state().read().items()));
}

fn delayed_quiz_backend(num_quizzes: usize) -> Arc<TestBackend> {
    Arc::new(TestBackend {
        load_delay: Duration::from_millis(500),
        ..TestBackend::new(quiz_catalog(num_quizzes))
    })
}

#[tokio::test(start_paused = true)]
async fn finish_loading_when_typing_back_to_the_applied_text() {
    let backend = delayed_quiz_backend(15);
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    sleep(Duration::from_millis(600)).await;

    session.input_search_text("Quiz 1");
    sleep(Duration::from_millis(350)).await;
    // Loading the first page of "Quiz 1"
    assert!(!session.state().read().fetch().is_idle());
    session.input_search_text("Quiz 12");
    sleep(Duration::from_millis(50)).await;
    session.input_search_text("Quiz 1");
    sleep(Duration::from_secs(5)).await;

    assert_eq!(
        vec![String::new(), "Quiz 1".to_owned()],
        backend.search_texts()
    );
    let state = session.state().read();
    assert!(state.fetch().is_idle());
    assert_eq!("Quiz 1", state.context().params.search_text);
    assert_eq!(
        vec!["q1", "q10", "q11", "q12", "q13", "q14", "q15"],
        ids(state.items())
    );
    assert_eq!(None, state.empty_state_message());
}

#[tokio::test(start_paused = true)]
async fn apply_search_text_typed_while_loading() {
    let backend = delayed_quiz_backend(15);
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    sleep(Duration::from_millis(600)).await;

    session.input_search_text("Quiz 1");
    sleep(Duration::from_millis(350)).await;
    assert!(!session.state().read().fetch().is_idle());
    session.input_search_text("Quiz 2");
    sleep(Duration::from_secs(2)).await;

    assert_eq!(
        vec![String::new(), "Quiz 1".to_owned(), "Quiz 2".to_owned()],
        backend.search_texts()
    );
    let state = session.state().read();
    assert!(state.fetch().is_idle());
    assert_eq!("Quiz 2", state.context().params.search_text);
    // The late result for "Quiz 1" has been discarded.
    assert_eq!(vec!["q2"], ids(state.items()));
}

#[tokio::test(start_paused = true)]
async fn goto_page() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(25)));
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    settle().await;
    assert!(session.goto_page(page(3)));
    settle().await;
    {
        let state = session.state().read();
        assert_eq!(Some(page(3)), state.current_page());
        assert_eq!(
            vec!["q21", "q22", "q23", "q24", "q25"],
            ids(state.items())
        );
    }
    assert!(!session.goto_page(page(4)));
    assert_eq!(2, backend.page_requests().len());
}

#[tokio::test(start_paused = true)]
async fn keep_previous_page_while_loading() {
    let backend = Arc::new(TestBackend {
        load_delay: Duration::from_millis(100),
        ..TestBackend::new(quiz_catalog(25))
    });
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    sleep(Duration::from_millis(150)).await;
    assert!(session.goto_page(page(2)));
    {
        let state = session.state().read();
        assert!(!state.fetch().is_idle());
        assert_eq!(Some(page(2)), state.current_page());
        assert_eq!("q1", state.items()[0].id);
    }
    sleep(Duration::from_millis(150)).await;
    assert_eq!("q11", session.state().read().items()[0].id);
}

#[tokio::test(start_paused = true)]
async fn discard_outdated_pages() {
    let backend = Arc::new(TestBackend {
        load_delay: Duration::from_millis(100),
        ..TestBackend::new(quiz_catalog(25))
    });
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    // Page 1 is still pending while requesting page 2.
    assert!(session.goto_page(page(2)));
    sleep(Duration::from_millis(150)).await;
    let state = session.state().read();
    assert_eq!(Some(page(2)), state.current_page());
    assert_eq!("q11", state.items()[0].id);
    assert_eq!(2, backend.page_requests().len());
}

#[test]
fn discard_results_of_outdated_context() {
    let mut state = State::new(OpenRequest::new(ResourceKind::Quiz, SelectionMode::Single));
    let outdated_context = state.fetch_page_started(FIRST_PAGE);
    assert!(state.update_search_text_input("quiz"));
    assert!(state.apply_search_text());
    let context = state.fetch_page_started(FIRST_PAGE);
    assert_ne!(outdated_context, context);
    let fetched = Page {
        items: vec![ResourceReference::new("q1", "Quiz 1")],
        total_pages: 1,
    };
    assert!(!state.fetch_page_finished(&outdated_context, FIRST_PAGE, Ok(fetched.clone())));
    assert!(state.items().is_empty());
    assert!(state.fetch_page_finished(&context, FIRST_PAGE, Ok(fetched)));
    assert_eq!(vec!["q1"], ids(state.items()));
}

#[tokio::test(start_paused = true)]
async fn show_empty_state_when_loading_failed() {
    let backend = Arc::new(TestBackend {
        offline: true,
        ..TestBackend::new(quiz_catalog(5))
    });
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    settle().await;
    let state = session.state().read();
    assert!(matches!(state.fetch(), FetchState::Failed { .. }));
    assert!(state.items().is_empty());
    assert_eq!(Some(EMPTY_STATE_MESSAGE), state.empty_state_message());
}

#[tokio::test(start_paused = true)]
async fn confirm_visible_item() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(25)));
    let (session, outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    settle().await;
    assert!(!session.confirm("q11"));
    assert!(!session.is_finished());
    assert!(session.confirm("q3"));
    assert!(session.is_finished());
    assert!(!session.cancel());
    assert_eq!(
        PickerOutcome::Confirmed(ResourceReference::new("q3", "Quiz 3")),
        outcome.recv().await
    );
}

#[tokio::test(start_paused = true)]
async fn cancel() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(5)));
    let (session, outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    assert!(session.cancel());
    assert!(!session.confirm("q1"));
    assert_eq!(PickerOutcome::Cancelled, outcome.recv().await);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_cancels() {
    let backend = Arc::new(TestBackend {
        load_delay: Duration::from_millis(100),
        ..TestBackend::new(quiz_catalog(5))
    });
    let (session, outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    session.input_search_text("Quiz");
    drop(session);
    assert_eq!(PickerOutcome::Cancelled, outcome.recv().await);
    // Neither the pending page nor the debounced search fails.
    sleep(Duration::from_secs(1)).await;
    assert_eq!(1, backend.page_requests().len());
}

#[tokio::test(start_paused = true)]
async fn select_multiple_items_across_pages() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(25)));
    let (session, outcome) = open_quiz_picker(&backend, SelectionMode::Multiple);
    settle().await;
    assert!(session.toggle_selected("q2"));
    assert!(session.toggle_selected("q1"));
    assert!(!session.toggle_selected("q11"));
    assert!(session.goto_page(page(2)));
    settle().await;
    assert!(session.toggle_selected("q11"));
    // Deselect an invisible item
    assert!(session.toggle_selected("q2"));
    assert!(session.toggle_selected("q12"));
    assert_eq!(3, session.state().read().selection().len());
    assert!(session.confirm_selection());
    assert_eq!(
        PickerOutcome::ConfirmedMany(vec![
            ResourceReference::new("q1", "Quiz 1"),
            ResourceReference::new("q11", "Quiz 11"),
            ResourceReference::new("q12", "Quiz 12"),
        ]),
        outcome.recv().await
    );
}

#[tokio::test(start_paused = true)]
async fn single_selection_mode() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(5)));
    let (session, _outcome) = open_quiz_picker(&backend, SelectionMode::Single);
    settle().await;
    assert!(!session.toggle_selected("q1"));
    assert!(!session.confirm_selection());
    assert!(!session.is_finished());
}

#[test]
fn refresh_selected_items_with_fetched_data() {
    let mut selection = SelectionMap::default();
    assert!(selection.select(ResourceReference::new("q1", "Old name")));
    assert!(selection.select(ResourceReference::new("q2", "Quiz 2")));
    assert!(!selection.select(ResourceReference::new("q1", "Quiz 1")));
    let fetched = [
        ResourceReference::new("q1", "New name"),
        ResourceReference::new("q3", "Quiz 3"),
    ];
    assert_eq!(1, selection.merge_fetched(&fetched));
    assert_eq!(
        &[
            ResourceReference::new("q1", "New name"),
            ResourceReference::new("q2", "Quiz 2"),
        ],
        selection.as_slice()
    );
    assert_eq!(0, selection.merge_fetched(&fetched));
    assert!(!selection.contains("q3"));
}

#[tokio::test(start_paused = true)]
async fn pick_quiz_through_dialog_host() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(25)));
    let host = DialogHost::new(
        Handle::current(),
        Arc::clone(&backend),
        PickerConfig {
            page_size: PageSize::new(5).unwrap(),
            ..Default::default()
        },
    );
    let mut active_session = host.subscribe_active_session();
    let items = vec![CollectionItem::new(QuizReference::new("q1"))];
    let mut editor = ListEditor::new(
        &items,
        EditorPolicy::default(),
        |_: &[CollectionItem<QuizReference>]| {},
    );
    let (picked, ()) = tokio::join!(editor.pick_resource(0, &host), async {
        active_session.changed().await.unwrap();
        let session = Option::clone(&active_session.read_ack()).unwrap();
        assert!(session.state().read().is_current_selection("q1"));
        settle().await;
        assert!(session.goto_page(page(2)));
        settle().await;
        assert!(session.confirm("q7"));
    });
    assert!(picked.unwrap());
    assert_eq!("q7", editor.items()[0].payload.quiz_id);
    assert!(host.active_session().is_none());
    assert_eq!(5, backend.page_requests()[0].page_size.get());
}

#[tokio::test(start_paused = true)]
async fn opening_another_picker_cancels_the_active_one() {
    let backend = Arc::new(TestBackend::new(quiz_catalog(5)));
    let host = DialogHost::new(Handle::current(), backend, PickerConfig::default());
    let (first, second) = tokio::join!(
        host.open(OpenRequest::new(ResourceKind::Quiz, SelectionMode::Single)),
        async {
            settle().await;
            let outcome = host.open(OpenRequest::new(ResourceKind::Quiz, SelectionMode::Single));
            settle().await;
            let session = host.active_session().unwrap();
            assert!(session.confirm("q5"));
            outcome.await
        }
    );
    assert_eq!(PickerOutcome::Cancelled, first);
    assert_eq!(
        PickerOutcome::Confirmed(ResourceReference::new("q5", "Quiz 5")),
        second
    );
}

#[tokio::test(start_paused = true)]
async fn filter_lesson_files_by_content_kind() {
    let mut catalog = Catalog::default();
    catalog.insert(
        ResourceKind::File,
        file("f1", "Cat anatomy", "application/pdf"),
    );
    catalog.insert(ResourceKind::File, file("f2", "Cat videos", "video/mp4"));
    let backend = Arc::new(TestBackend::new(catalog));
    let host = DialogHost::new(
        Handle::current(),
        Arc::clone(&backend),
        PickerConfig::default(),
    );
    let items = vec![CollectionItem::new(LessonContent::new(ContentKind::Video))];
    let mut editor = ListEditor::new(
        &items,
        EditorPolicy { min_items: 1 },
        |_: &[CollectionItem<LessonContent>]| {},
    );
    let (picked, ()) = tokio::join!(editor.pick_resource(0, &host), async {
        settle().await;
        let session = host.active_session().unwrap();
        assert_eq!(vec!["f2"], ids(session.state().read().items()));
        assert!(session.confirm("f2"));
    });
    assert!(picked.unwrap());
    assert_eq!(
        Some("f2"),
        editor.items()[0].payload.resource_id.as_deref()
    );
}

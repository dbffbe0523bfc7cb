// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use loom_predicate_core::{
	Comparison, Connective, Expression, Operator, Predicate, PredicateError, ValueLocale,
};
use loom_predicate_editor::{
	ComparisonTemplate, CompoundTemplate, EditorError, FormattingTable, Losses, PredicateController,
	RightValue, RowIdentity, RowState, RowSummary, TemplateCatalog, ValueKind,
};

fn catalog() -> TemplateCatalog {
	TemplateCatalog::new(vec![
		CompoundTemplate::new(vec![Connective::And, Connective::Or, Connective::Not]).into(),
		ComparisonTemplate::new(
			vec![Expression::key_path("name"), Expression::key_path("email")],
			vec![Operator::Equal, Operator::BeginsWith, Operator::Contains],
		)
		.with_value_kind(ValueKind::String)
		.into(),
		ComparisonTemplate::new(
			vec![Expression::key_path("age")],
			vec![Operator::LessThan, Operator::GreaterThan],
		)
		.with_value_kind(ValueKind::Integer)
		.into(),
		ComparisonTemplate::new(vec![Expression::key_path("status")], vec![Operator::Equal])
			.with_right_operands(vec![Expression::string("open"), Expression::string("closed")])
			.into(),
	])
	.unwrap()
}

fn name_is(value: &str) -> Predicate {
	Comparison::new(Expression::key_path("name"), Operator::Equal, Expression::string(value)).into()
}

fn age_over(value: i64) -> Predicate {
	Comparison::new(Expression::key_path("age"), Operator::GreaterThan, Expression::integer(value)).into()
}

fn titles(controller: &PredicateController) -> Vec<Option<String>> {
	controller.rows().into_iter().map(|view| view.title).collect()
}

fn identities(controller: &PredicateController) -> Vec<RowIdentity> {
	controller.rows().into_iter().map(|view| view.identity).collect()
}

#[test]
fn nested_insertion_keeps_subtrees_contiguous() {
	let mut controller = PredicateController::new(catalog());

	let g = controller.add_group_row(None).unwrap();
	assert_eq!(titles(&controller), vec![None]);

	let c1 = controller.add_group_row(Some(g)).unwrap();
	assert_eq!(identities(&controller), vec![RowIdentity::Group(g), RowIdentity::Group(c1)]);

	assert!(controller.add_row("name", Some(g)).unwrap());
	assert_eq!(
		titles(&controller),
		vec![None, None, Some("name".to_string())]
	);
	assert_eq!(identities(&controller)[..2], [RowIdentity::Group(g), RowIdentity::Group(c1)]);

	assert!(controller.add_row("age", Some(c1)).unwrap());
	assert_eq!(
		titles(&controller),
		vec![None, None, Some("age".to_string()), Some("name".to_string())]
	);
	controller.validate().unwrap();

	assert!(controller.add_row("email", Some(c1)).unwrap());

	let views = controller.rows();
	assert_eq!(views[0].identity, RowIdentity::Group(g));
	assert_eq!(views[1].identity, RowIdentity::Group(c1));
	assert_eq!(
		titles(&controller),
		vec![
			None,
			None,
			Some("age".to_string()),
			Some("email".to_string()),
			Some("name".to_string()),
		]
	);
	let indentation: Vec<usize> = views.iter().map(|v| v.indentation).collect();
	assert_eq!(indentation, vec![0, 1, 2, 2, 1]);
	assert_eq!(views[2].parent, Some(c1));
	assert_eq!(views[4].parent, Some(g));
	controller.validate().unwrap();
}

#[test]
fn deleting_group_removes_subtree() {
	let mut controller = PredicateController::new(catalog());
	controller.set_predicate(&Predicate::and(vec![
		name_is("a"),
		Predicate::or(vec![age_over(1), Predicate::not(age_over(2))]),
		name_is("b"),
	]));
	assert_eq!(controller.len(), 7);

	assert_eq!(controller.delete_row(2), 4);
	assert_eq!(controller.len(), 3);
	assert_eq!(
		controller.current_predicate(),
		&Predicate::and(vec![name_is("a"), name_is("b")])
	);
	controller.validate().unwrap();

	assert_eq!(controller.delete_row(1), 1);
	assert_eq!(controller.current_predicate(), &Predicate::and(vec![name_is("b")]));

	assert_eq!(controller.delete_row(10), 0);
	assert_eq!(controller.len(), 2);

	assert_eq!(controller.delete_row(0), 2);
	assert!(controller.is_empty());
	assert_eq!(controller.current_predicate(), &Predicate::Empty);
}

#[test]
fn fully_matching_comparison_scores_one() {
	let catalog = catalog();
	let status: Predicate =
		Comparison::new(Expression::key_path("status"), Operator::Equal, Expression::string("open")).into();
	let (_, template) = catalog.iter().nth(3).unwrap();
	assert_eq!(loom_predicate_editor::score(template, &status), 1.0);
}

#[test]
fn group_row_without_selection_synthesizes_and() {
	let mut controller = PredicateController::new(catalog());
	let root = controller.add_group_row(None).unwrap();
	controller.add_row("name", Some(root)).unwrap();
	controller.set_right_text(1, "jo").unwrap();
	controller.add_row("age", Some(root)).unwrap();
	controller.set_right_text(2, "30").unwrap();

	let RowState::Compound(state) = controller.row(0).unwrap().state() else {
		panic!("root is not a group row");
	};
	assert_eq!(state.connective, None);
	assert_eq!(
		controller.current_predicate(),
		&Predicate::and(vec![
			Comparison::new(Expression::key_path("name"), Operator::Equal, Expression::string("jo")).into(),
			Comparison::new(Expression::key_path("age"), Operator::LessThan, Expression::integer(30)).into(),
		])
	);
}

#[test]
fn missing_operands_drop_out_of_parent() {
	let mut controller = PredicateController::new(catalog());
	let root = controller.add_group_row(None).unwrap();
	controller.add_row("name", Some(root)).unwrap();
	controller.add_row("age", Some(root)).unwrap();

	// text rows need input, numeric rows default to zero
	assert_eq!(
		controller.current_predicate(),
		&Predicate::and(vec![Comparison::new(
			Expression::key_path("age"),
			Operator::LessThan,
			Expression::integer(0)
		)
		.into()])
	);
	let views = controller.rows();
	assert_eq!(views[1].predicate, None);
	assert!(views[2].predicate.is_some());
}

#[test]
fn update_connective_resynthesizes_root() {
	let mut controller = PredicateController::new(catalog());
	controller.set_predicate(&Predicate::and(vec![name_is("a"), name_is("b")]));

	assert_eq!(controller.update_connective(Connective::Or), Ok(true));
	assert_eq!(
		controller.current_predicate(),
		&Predicate::or(vec![name_is("a"), name_is("b")])
	);
	assert_eq!(
		controller.rows()[0].summary,
		RowSummary::Compound {
			connective: Connective::Or
		}
	);

	let mut narrow = PredicateController::new(
		TemplateCatalog::new(vec![
			CompoundTemplate::new(vec![Connective::And]).into(),
			ComparisonTemplate::new(vec![Expression::key_path("name")], vec![Operator::Equal]).into(),
		])
		.unwrap(),
	);
	assert_eq!(narrow.update_connective(Connective::Or), Ok(false));
	narrow.add_group_row(None).unwrap();
	assert_eq!(
		narrow.update_connective(Connective::Not),
		Err(EditorError::UnsupportedConnective(Connective::Not))
	);
}

#[test]
fn top_level_comparison_is_single_leaf_row() {
	let mut controller = PredicateController::new(catalog());
	assert!(controller.set_predicate(&name_is("x")).is_lossless());
	assert_eq!(controller.len(), 1);
	assert_eq!(controller.rows()[0].identity, RowIdentity::Leaf);
	assert_eq!(controller.current_predicate(), &name_is("x"));
	assert_eq!(controller.update_connective(Connective::Or), Ok(false));
}

#[test]
fn unmatched_fragments_are_reported() {
	let mut controller = PredicateController::new(catalog());
	let unknown: Predicate =
		Comparison::new(Expression::key_path("phone"), Operator::Matches, Expression::null())
			.with_modifier(loom_predicate_core::Modifier::All)
			.into();
	let losses = controller.set_predicate(&Predicate::or(vec![unknown, name_is("a")]));
	assert_eq!(
		losses,
		Losses {
			dropped: 1,
			substituted: 0
		}
	);
	assert_eq!(controller.current_predicate(), &Predicate::or(vec![name_is("a")]));
}

#[test]
fn substituted_selections_are_reported() {
	let catalog = TemplateCatalog::new(vec![
		CompoundTemplate::new(vec![Connective::And, Connective::Or]).into(),
		ComparisonTemplate::new(vec![Expression::key_path("name")], vec![Operator::Equal])
			.with_value_kind(ValueKind::String)
			.into(),
	])
	.unwrap();
	let mut controller = PredicateController::new(catalog);
	let phone: Predicate =
		Comparison::new(Expression::key_path("phone"), Operator::Equal, Expression::string("x")).into();

	let losses = controller.set_predicate(&Predicate::not(phone));
	assert_eq!(
		losses,
		Losses {
			dropped: 0,
			substituted: 2
		}
	);
	// connective and left operand both fell back to the first offered entry
	assert_eq!(controller.current_predicate(), &Predicate::and(vec![name_is("x")]));
}

#[test]
fn structural_misuse_fails_fast() {
	assert_eq!(
		PredicateController::from_templates(vec![]).unwrap_err(),
		EditorError::EmptyCatalog
	);
	assert_eq!(
		PredicateController::from_templates(vec![ComparisonTemplate::new(
			vec![Expression::key_path("name")],
			vec![Operator::Equal]
		)
		.into()])
		.unwrap_err(),
		EditorError::MissingGroupTemplate
	);

	let mut controller = PredicateController::new(catalog());
	controller.set_predicate(&Predicate::and(vec![name_is("a")]));
	let missing = loom_predicate_editor::RowId::new();
	assert_eq!(
		controller.add_row("name", Some(missing)),
		Err(EditorError::ParentNotFound(missing))
	);
	assert_eq!(controller.add_row("nickname", None), Ok(false));
	assert_eq!(
		controller.set_right_text(0, "x"),
		Err(EditorError::StateKindMismatch(0))
	);
	assert_eq!(
		controller.set_row_state(1, RowState::Compound(Default::default())),
		Err(EditorError::StateKindMismatch(1))
	);
}

#[test]
fn observers_fire_only_when_predicate_changes() {
	let mut controller = PredicateController::new(catalog());
	let count = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&count);
	let id = controller.on_change(move || {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	let root = controller.add_group_row(None).unwrap();
	assert_eq!(count.load(Ordering::SeqCst), 1);

	// incomplete row leaves the predicate as it was
	controller.add_row("name", Some(root)).unwrap();
	assert_eq!(count.load(Ordering::SeqCst), 1);

	controller.set_right_text(1, "jo").unwrap();
	assert_eq!(count.load(Ordering::SeqCst), 2);

	let same = controller.current_predicate().clone();
	controller.set_predicate(&same);
	assert_eq!(count.load(Ordering::SeqCst), 2);

	assert!(controller.remove_observer(id));
	controller.delete_row(0);
	assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn observers_run_in_registration_order() {
	let mut controller = PredicateController::new(catalog());
	let log = Arc::new(Mutex::new(Vec::new()));
	for name in ["rows", "preview"] {
		let log = Arc::clone(&log);
		controller.on_change(move || log.lock().unwrap().push(name));
	}
	controller.set_predicate(&Predicate::and(vec![name_is("a")]));
	controller.update_connective(Connective::Or).unwrap();
	assert_eq!(
		*log.lock().unwrap(),
		vec!["rows", "preview", "rows", "preview"]
	);
}

#[test]
fn localized_labels_and_operators() {
	let table: FormattingTable = [
		(
			"%[name]@ %[begins with]@ %[jo]@".to_string(),
			"%1$[Nombre]@ %2$[empieza con]@ %3$[jo]@".to_string(),
		),
		(
			"%[status]@ %[is]@ %[closed]@".to_string(),
			"%1$[Estado]@ %2$[es]@ %3$[cerrado]@".to_string(),
		),
	]
	.into_iter()
	.collect();
	let mut controller = PredicateController::new(catalog()).with_formatting(table);
	let root = controller.add_group_row(None).unwrap();

	assert!(controller.add_row("Nombre", Some(root)).unwrap());
	controller.set_operator(1, "empieza con").unwrap();
	controller.set_right_text(1, "jo").unwrap();

	assert!(controller.add_row("Estado", Some(root)).unwrap());
	controller.set_right_text(2, "cerrado").unwrap();

	assert_eq!(
		controller.current_predicate(),
		&Predicate::and(vec![
			Comparison::new(Expression::key_path("name"), Operator::BeginsWith, Expression::string("jo")).into(),
			Comparison::new(Expression::key_path("status"), Operator::Equal, Expression::string("closed")).into(),
		])
	);

	let views = controller.rows();
	assert_eq!(views[1].title.as_deref(), Some("Nombre"));
	assert_eq!(
		views[1].summary,
		RowSummary::Comparison {
			left: Some("Nombre".to_string()),
			operator: Some("empieza con".to_string()),
			right: Some("jo".to_string()),
		}
	);
	assert_eq!(
		controller.set_operator(1, "contiene"),
		Err(EditorError::Predicate(PredicateError::UnrecognizedOperator(
			"contiene".to_string()
		)))
	);
}

#[test]
fn formatting_lookups_roundtrip() {
	let table: FormattingTable = [
		("%[name]@ %[is]@ %[a]@", "%1$[Nombre]@ %2$[es]@ %3$[a]@"),
		("%[email]@ %[contains]@ %[b]@", "%3$[b]@ %2$[contiene]@ %1$[Correo]@"),
		("%[age]@ %[is less than]@ %[3]@", "%[Edad]@ %[es menor que]@ %[tres]@"),
	]
	.into_iter()
	.map(|(k, v)| (k.to_string(), v.to_string()))
	.collect();

	for localized in table.localized_tokens(loom_predicate_editor::TokenPosition::Left) {
		let base = table.lhs_reverse_match(localized).unwrap();
		assert_eq!(table.lhs_match(base), Some(localized));
	}
	assert_eq!(table.lhs_reverse_match("Correo"), Some("email"));
	assert_eq!(table.rhs_reverse_match("tres"), Some("3"));
}

#[test]
fn move_row_to_top_level() {
	let mut controller = PredicateController::new(catalog());
	controller.set_predicate(&Predicate::and(vec![
		Predicate::or(vec![name_is("a")]),
		name_is("b"),
	]));
	let moved = controller.move_row(1, None).unwrap();
	assert_eq!(moved, 2);
	controller.validate().unwrap();
	let views = controller.rows();
	assert_eq!(views[2].parent, None);
	assert_eq!(views[2].indentation, 0);
	assert_eq!(views[3].indentation, 1);
	// the root predicate follows the first row only
	assert_eq!(controller.current_predicate(), &Predicate::and(vec![name_is("b")]));
}

#[test]
fn set_row_state_accepts_matching_shape() {
	let mut controller = PredicateController::new(catalog());
	controller.set_predicate(&Predicate::and(vec![name_is("a")]));
	controller
		.set_row_state(
			1,
			RowState::Comparison(loom_predicate_editor::ComparisonState {
				left: Some(Expression::key_path("email")),
				operator: Some(Operator::Contains),
				right: RightValue::Expression(Expression::string("@example.com")),
			}),
		)
		.unwrap();
	assert_eq!(
		controller.current_predicate(),
		&Predicate::and(vec![Comparison::new(
			Expression::key_path("email"),
			Operator::Contains,
			Expression::string("@example.com")
		)
		.into()])
	);
	assert_eq!(
		controller.set_row_state(5, RowState::Compound(Default::default())),
		Err(EditorError::IndexOutOfRange { index: 5, len: 2 })
	);
}

#[test]
fn unusable_date_format_still_renders_rows() {
	let catalog = TemplateCatalog::new(vec![
		CompoundTemplate::default().into(),
		ComparisonTemplate::new(vec![Expression::key_path("due")], vec![Operator::LessThan])
			.with_value_kind(ValueKind::Date)
			.into(),
	])
	.unwrap();
	let locale = ValueLocale {
		short_date_format: "%Q".to_string(),
		..Default::default()
	};
	let mut controller = PredicateController::new(catalog).with_locale(locale);
	let due = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
	controller.set_predicate(&Predicate::and(vec![Comparison::new(
		Expression::key_path("due"),
		Operator::LessThan,
		Expression::date(due),
	)
	.into()]));

	let views = controller.rows();
	assert_eq!(
		views[1].summary,
		RowSummary::Comparison {
			left: Some("due".to_string()),
			operator: Some(Operator::LessThan.title().to_string()),
			right: Some("2024-03-09T00:00:00+00:00".to_string()),
		}
	);
}

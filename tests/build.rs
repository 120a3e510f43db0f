//! Build-side behavior: attribute application, clone isolation, and
//! association resolution without a storage sink.

mod support;

use seedling::prelude::*;
use support::*;

#[test]
fn sequences_are_monotonic_across_derived_clones() {
	let base = user_factory();

	// Deriving clones advances nothing; the sequence belongs to the
	// attribute, not to any one clone.
	let _trimmed = base.omit(["username"]);
	let _extended = base.attrs([attr::fix_str("phone", "091234567")]);

	for expected in 1..=5_i64 {
		assert_eq!(base.must_build().id, expected);
	}
}

#[test]
fn build_n_yields_contiguous_sequence_values() {
	let users = user_factory().must_build_n(5);
	let ids: Vec<i64> = users.iter().map(|user| user.id).collect();
	assert_eq!(ids, vec![1, 2, 3, 4, 5]);
	for user in &users {
		assert!(!user.username.is_empty());
		assert!((18..=60).contains(&user.age.unwrap()));
	}
}

#[test]
fn build_n_zero_is_invalid_count() {
	let err = user_factory().build_n(0).unwrap_err();
	assert!(matches!(err, FactoryError::InvalidCount));
	let err = user_factory().insert_n(0).unwrap_err();
	assert!(matches!(err, FactoryError::InvalidCount));
}

#[test]
fn omit_clone_leaves_the_base_intact() {
	let base = user_factory();
	let trimmed = base.omit(["username"]);

	assert!(trimmed.must_build().username.is_empty());
	assert!(!base.must_build().username.is_empty());
}

#[test]
fn only_then_omit_does_not_set_the_field_named_by_both() {
	let factory = user_factory().only(["id", "username"]).omit(["username"]);
	let user = factory.must_build();
	assert!(user.username.is_empty());
	assert!(user.age.is_none());
	assert_ne!(user.id, 0);
}

#[test]
fn attrs_replaces_same_named_attributes_in_place() {
	let base = user_factory();
	let pinned = base.attrs([attr::fix_str("username", "vic")]);

	assert_eq!(pinned.must_build().username, "vic");
	assert_ne!(base.must_build().username, "vic");
}

#[test]
fn template_prototype_values_carry_into_every_build() {
	let factory = Factory::new(
		User {
			phone: "0912345678".into(),
			host: true,
			..User::default()
		},
		[attr::seq("id", 1)],
	);

	for _ in 0..3 {
		let user = factory.must_build();
		assert_eq!(user.phone, "0912345678");
		assert!(user.host);
	}
}

#[test]
fn belongs_to_builds_the_related_object_first_and_copies_its_reference() {
	let factory = home_factory().belongs_to(
		"location",
		location_factory()
			.to_association()
			.refer_field("id")
			.foreign_field("location_id")
			.foreign_key("location_id"),
	);

	let home = factory.must_build();
	let location = home.location.expect("location should be built");
	assert_ne!(location.id, 0);
	assert_eq!(home.location_id, location.id);
	assert!(!location.address.is_empty());
}

#[test]
fn has_one_propagates_the_owner_reference_into_the_related_object() {
	let factory = user_factory().has_one(
		"home",
		home_factory()
			.to_association()
			.refer_field("id")
			.foreign_field("host_id")
			.foreign_key("host_id"),
	);

	let user = factory.must_build();
	let home = user.home.expect("home should be built");
	assert_ne!(user.id, 0);
	assert_ne!(home.id, 0);
	assert_eq!(home.host_id, user.id);
}

#[test]
fn has_many_appends_num_related_objects() {
	let home_assoc = home_factory()
		.to_association()
		.refer_field("id")
		.foreign_field("host_id")
		.foreign_key("host_id");
	let factory = user_factory().has_many("rented", home_assoc, 5);

	let user = factory.must_build();
	assert_eq!(user.rented.len(), 5);
	for home in &user.rented {
		assert_ne!(home.id, 0);
		assert_eq!(home.host_id, user.id);
	}
}

#[test]
fn one_association_serves_sibling_has_one_and_has_many_edges() {
	let home_assoc = home_factory()
		.to_association()
		.refer_field("id")
		.foreign_field("host_id")
		.foreign_key("host_id");
	let factory = user_factory()
		.has_one("home", home_assoc.clone())
		.has_many("rented", home_assoc, 5);

	let user = factory.must_build();
	let home = user.home.expect("home should be built");
	assert_eq!(home.host_id, user.id);
	assert_eq!(user.rented.len(), 5);
}

#[test]
fn nested_associations_resolve_through_the_whole_graph() {
	let home_assoc = home_factory()
		.belongs_to(
			"location",
			location_factory()
				.to_association()
				.refer_field("id")
				.foreign_field("location_id")
				.foreign_key("location_id"),
		)
		.to_association()
		.refer_field("id")
		.foreign_field("host_id")
		.foreign_key("host_id");
	let factory = user_factory()
		.has_one("home", home_assoc.clone())
		.has_many("rented", home_assoc, 3);

	let user = factory.must_build();
	let home = user.home.expect("home should be built");
	let location = home.location.expect("location should be built");
	assert_eq!(home.location_id, location.id);
	for rented in &user.rented {
		let location = rented.location.as_ref().expect("location should be built");
		assert_eq!(rented.location_id, location.id);
	}
}

#[test]
fn many_to_many_wires_both_sides() {
	let project_assoc = project_factory()
		.to_association()
		.refer_field("id")
		.refer_column("employee_id")
		.foreign_field("id")
		.foreign_key("project_id")
		.associated_field("employees")
		.join_table("employees_projects", [attr::seq("id", 1).with_column("id")]);
	let factory = employee_factory().many_to_many("projects", project_assoc, 2);

	let employee = factory.must_build();
	assert_eq!(employee.projects.len(), 2);
	for project in &employee.projects {
		assert_ne!(project.id, 0);
		assert_eq!(project.employees.len(), 1);
		assert_eq!(project.employees[0].id, employee.id);
	}
}

#[test]
fn context_attributes_read_the_partially_built_object() {
	let factory = user_factory().attrs([Attribute::with_context(
		"username",
		AttrKind::Str,
		|context| {
			let user = context
				.downcast_ref::<User>()
				.ok_or_else(|| FactoryError::generation("username", "unexpected context"))?;
			Ok(Value::Str(format!("user-{}", user.id)))
		},
	)]);

	let user = factory.must_build();
	assert_eq!(user.username, format!("user-{}", user.id));
}

#[test]
fn unknown_attribute_field_fails_with_field_not_found() {
	let factory = user_factory().attrs([attr::fix_int("salary", 1)]);
	assert!(matches!(
		factory.build().unwrap_err(),
		FactoryError::FieldNotFound { .. }
	));
}

#[test]
fn cross_kind_attribute_fails_with_type_mismatch() {
	let factory = user_factory().attrs([attr::fix_str("id", "not-a-number")]);
	match factory.build().unwrap_err() {
		FactoryError::TypeMismatch { field, .. } => assert_eq!(field, "id"),
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn scalar_writes_to_relation_fields_are_rejected() {
	let factory = user_factory().attrs([attr::fix_int("home", 1)]);
	assert!(matches!(
		factory.build().unwrap_err(),
		FactoryError::FieldUnsettable { .. }
	));
}

//! Dynamic field group binder

use crate::state::{FieldTemplate, GroupContainer};

/// Append a new group instantiated from `template`; returns its index
pub fn add_group(template: &FieldTemplate, container: &mut GroupContainer) -> usize {
    let index = container.next_index();
    container.push(template.instantiate(index));
    tracing::debug!(container = %container.id, index, "added dynamic field group");
    index
}

/// Remove the group a remove control sits in. Surviving groups keep
/// their indices.
pub fn remove_group(container: &mut GroupContainer, index: usize) -> bool {
    let removed = container.remove(index);
    if removed {
        tracing::debug!(container = %container.id, index, "removed dynamic field group");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldKind, IndexedName, TemplateField, TemplateLabel};
    use pretty_assertions::assert_eq;

    fn variant_template() -> FieldTemplate {
        FieldTemplate {
            fields: vec![
                TemplateField::new("variants[__INDEX__][name]", FieldKind::Text)
                    .id("variant-__INDEX__-name"),
                TemplateField::new("variants[__INDEX__][price]", FieldKind::Number)
                    .id("variant-__INDEX__-price"),
            ],
            labels: vec![
                TemplateLabel {
                    for_id: Some(IndexedName::parse("variant-__INDEX__-name")),
                    text: "Name".to_string(),
                },
                TemplateLabel {
                    for_id: Some(IndexedName::parse("variant-__INDEX__-price")),
                    text: "Price".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_three_additions_are_indexed_in_sequence() {
        let template = variant_template();
        let mut container = GroupContainer::new("variants");

        let indices: Vec<usize> = (0..3)
            .map(|_| add_group(&template, &mut container))
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let names: Vec<&str> = container
            .groups
            .iter()
            .map(|g| g.fields[0].name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["variants[0][name]", "variants[1][name]", "variants[2][name]"]
        );
        let ids: Vec<Option<&str>> = container
            .groups
            .iter()
            .map(|g| g.fields[1].id.as_deref())
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("variant-0-price"),
                Some("variant-1-price"),
                Some("variant-2-price")
            ]
        );
    }

    #[test]
    fn test_labels_follow_their_inputs() {
        let template = variant_template();
        let mut container = GroupContainer::new("variants");
        add_group(&template, &mut container);
        add_group(&template, &mut container);

        for group in &container.groups {
            for (field, label) in group.fields.iter().zip(&group.labels) {
                assert_eq!(field.id, label.for_id);
            }
        }
    }

    #[test]
    fn test_removal_does_not_renumber() {
        let template = variant_template();
        let mut container = GroupContainer::new("variants");
        for _ in 0..3 {
            add_group(&template, &mut container);
        }

        assert!(remove_group(&mut container, 1));
        assert_eq!(container.indices(), vec![0, 2]);
        assert_eq!(container.groups[1].fields[0].name, "variants[2][name]");
    }

    #[test]
    fn test_addition_after_removal_does_not_collide() {
        let template = variant_template();
        let mut container = GroupContainer::new("variants");
        for _ in 0..3 {
            add_group(&template, &mut container);
        }
        remove_group(&mut container, 1);

        let index = add_group(&template, &mut container);
        assert_eq!(index, 3);
        assert_eq!(container.indices(), vec![0, 2, 3]);
    }

    #[test]
    fn test_remove_unknown_index() {
        let mut container = GroupContainer::new("variants");
        assert!(!remove_group(&mut container, 7));
    }
}

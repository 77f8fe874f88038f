pub(crate) mod apply_templates;

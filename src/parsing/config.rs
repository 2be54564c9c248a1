//! The scan-wide policy surface: which optional parts of a classfile to bother decoding, and
//! which visibility/feature filters to apply.
//!
//! Parsing every attribute of every field and method on a large classpath is wasted work when a
//! caller only needs, say, class hierarchies. [`ScanConfig`] lets a caller opt into the more
//! expensive passes (field/method retention, annotations, inter-class dependency tracking,
//! external-class discovery) only when they're actually needed, builder-style.

/// Policy flags controlling [`crate::parsing::class_parser::ClassfileParser`]'s visibility
/// filters and which optional classfile data it retains.
///
/// All flags default to `false`: a [`ScanConfig::default()`] enforces every visibility filter
/// (public-only) and retains nothing beyond the structural skeleton a class-graph link needs
/// (name, modifiers, superclass, interfaces) — no field or method records, no annotations, no
/// dependency tracking, and no external-class discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanConfig {
    /// When `false` (the default), only `public` classes (and `module-info`/`package-info`
    /// classfiles) are parsed; all others are [`crate::parsing::errors::SkipReason::NotVisible`].
    pub ignore_class_visibility: bool,
    /// When `false` (the default), only `public` fields are retained.
    pub ignore_field_visibility: bool,
    /// When `false` (the default), only `public` methods are retained.
    pub ignore_method_visibility: bool,
    /// Retain a [`crate::class::FieldInfo`] for each visible field.
    pub enable_field_info: bool,
    /// Retain a [`crate::class::MethodInfo`] for each visible method. Always overridden to `true`
    /// for an annotation interface, since its elements' default values must be captured.
    pub enable_method_info: bool,
    /// Decode class-, field-, method-, and parameter-level annotations at all.
    pub enable_annotation_info: bool,
    /// When [`Self::enable_annotation_info`] is set, whether to skip `RuntimeInvisibleAnnotations`
    /// (and the invisible half of parameter annotations) rather than merging them in.
    pub disable_runtime_invisible_annotations: bool,
    /// Retain a `static final` field's `ConstantValue` as [`crate::class::FieldInfo::constant_value`].
    /// Takes effect independently of [`Self::enable_field_info`]: see §4.4's field-retention rule.
    pub enable_static_final_field_constant_initializer_values: bool,
    /// Run [`crate::references::ReferenceCollector`] to populate
    /// [`crate::class::ParsedClass::referenced_class_names`].
    pub enable_inter_class_dependencies: bool,
    /// Run [`crate::discovery::ExternalClassDiscoverer`] after parsing to schedule newly
    /// referenced external classes.
    pub extend_scanning_upwards_to_external_classes: bool,
}

impl ScanConfig {
    /// A config with every optional pass enabled and every visibility filter disabled — the most
    /// thorough, most expensive scan.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            ignore_class_visibility: true,
            ignore_field_visibility: true,
            ignore_method_visibility: true,
            enable_field_info: true,
            enable_method_info: true,
            enable_annotation_info: true,
            disable_runtime_invisible_annotations: false,
            enable_static_final_field_constant_initializer_values: true,
            enable_inter_class_dependencies: true,
            extend_scanning_upwards_to_external_classes: true,
        }
    }

    /// Builder: toggle class visibility enforcement.
    #[must_use]
    pub const fn with_ignore_class_visibility(mut self, enabled: bool) -> Self {
        self.ignore_class_visibility = enabled;
        self
    }

    /// Builder: toggle field visibility enforcement.
    #[must_use]
    pub const fn with_ignore_field_visibility(mut self, enabled: bool) -> Self {
        self.ignore_field_visibility = enabled;
        self
    }

    /// Builder: toggle method visibility enforcement.
    #[must_use]
    pub const fn with_ignore_method_visibility(mut self, enabled: bool) -> Self {
        self.ignore_method_visibility = enabled;
        self
    }

    /// Builder: enable retaining [`crate::class::FieldInfo`] records.
    #[must_use]
    pub const fn with_field_info(mut self, enabled: bool) -> Self {
        self.enable_field_info = enabled;
        self
    }

    /// Builder: enable retaining [`crate::class::MethodInfo`] records.
    #[must_use]
    pub const fn with_method_info(mut self, enabled: bool) -> Self {
        self.enable_method_info = enabled;
        self
    }

    /// Builder: enable annotation decoding.
    #[must_use]
    pub const fn with_annotation_info(mut self, enabled: bool) -> Self {
        self.enable_annotation_info = enabled;
        self
    }

    /// Builder: enable static-final `ConstantValue` retention.
    #[must_use]
    pub const fn with_static_final_field_constant_initializer_values(mut self, enabled: bool) -> Self {
        self.enable_static_final_field_constant_initializer_values = enabled;
        self
    }

    /// Builder: enable inter-class dependency tracking.
    #[must_use]
    pub const fn with_inter_class_dependencies(mut self, enabled: bool) -> Self {
        self.enable_inter_class_dependencies = enabled;
        self
    }

    /// Builder: enable external-class discovery / upward scan extension.
    #[must_use]
    pub const fn with_extend_scanning_upwards_to_external_classes(mut self, enabled: bool) -> Self {
        self.extend_scanning_upwards_to_external_classes = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_maximally_strict() {
        let config = ScanConfig::default();
        assert!(!config.ignore_class_visibility);
        assert!(!config.enable_field_info);
        assert!(!config.extend_scanning_upwards_to_external_classes);
    }

    #[test]
    fn everything_enables_every_pass() {
        let config = ScanConfig::everything();
        assert!(config.ignore_class_visibility);
        assert!(config.enable_method_info);
        assert!(config.enable_inter_class_dependencies);
    }
}

//! Renamings between two naming namespaces, and the algebra over them.
//!
//! A [`Mappings`] renames classes, fields and methods from an 'original' namespace
//! into a 'renamed' one. The renamed side of every member is expected to be consistent
//! with the class renames: its declaring type (and signature) are given in the renamed namespace.
use crate::bimap::{InjectiveMap, RenameError};
use crate::types::{FieldData, MethodData, TypeName};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mappings {
    classes: InjectiveMap<TypeName>,
    fields: InjectiveMap<FieldData>,
    methods: InjectiveMap<MethodData>,
}
impl Mappings {
    #[inline]
    pub fn empty() -> Mappings {
        Mappings::default()
    }
    #[inline]
    pub fn classes(&self) -> impl Iterator<Item = (&TypeName, &TypeName)> {
        self.classes.iter()
    }
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (&FieldData, &FieldData)> {
        self.fields.iter()
    }
    #[inline]
    pub fn methods(&self) -> impl Iterator<Item = (&MethodData, &MethodData)> {
        self.methods.iter()
    }
    #[inline]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
    #[inline]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }
    #[inline]
    pub fn get_remapped_class(&self, original: &TypeName) -> Option<&TypeName> {
        self.classes.get(original)
    }
    #[inline]
    pub fn get_remapped_field(&self, original: &FieldData) -> Option<&FieldData> {
        self.fields.get(original)
    }
    #[inline]
    pub fn get_remapped_method(&self, original: &MethodData) -> Option<&MethodData> {
        self.methods.get(original)
    }
    /// Rename the class, leaving it unchanged if there's no explicit entry
    #[inline]
    pub fn remap_class(&self, original: &TypeName) -> TypeName {
        self.classes.get(original).cloned().unwrap_or_else(|| original.clone())
    }
    /// Rename the field, falling back to renaming just its declaring type
    pub fn remap_field(&self, original: &FieldData) -> FieldData {
        match self.fields.get(original) {
            Some(renamed) => renamed.clone(),
            None => FieldData::new(self.remap_class(&original.declaring_type), original.name.clone()),
        }
    }
    /// Rename the method, falling back to renaming just the types it references
    pub fn remap_method(&self, original: &MethodData) -> MethodData {
        match self.methods.get(original) {
            Some(renamed) => renamed.clone(),
            None => MethodData::new(
                self.remap_class(&original.declaring_type),
                original.name.clone(),
                original.signature.map_classes(|name| self.classes.get(name).cloned()),
            ),
        }
    }
    fn unmap_class(&self, renamed: &TypeName) -> TypeName {
        self.classes.get_inverse(renamed).cloned().unwrap_or_else(|| renamed.clone())
    }
    fn unmap_field(&self, renamed: &FieldData) -> FieldData {
        match self.fields.get_inverse(renamed) {
            Some(original) => original.clone(),
            None => FieldData::new(self.unmap_class(&renamed.declaring_type), renamed.name.clone()),
        }
    }
    fn unmap_method(&self, renamed: &MethodData) -> MethodData {
        match self.methods.get_inverse(renamed) {
            Some(original) => original.clone(),
            None => MethodData::new(
                self.unmap_class(&renamed.declaring_type),
                renamed.name.clone(),
                renamed.signature.map_classes(|name| self.classes.get_inverse(name).cloned()),
            ),
        }
    }
    /// Swap the original and renamed sides
    pub fn inverted(&self) -> Mappings {
        let copy = self.clone();
        Mappings {
            classes: copy.classes.inverted(),
            fields: copy.fields.inverted(),
            methods: copy.methods.inverted(),
        }
    }
    /// Chain these mappings with `next`, whose original namespace is our renamed namespace.
    ///
    /// Every entry of `self` is renamed through `next`,
    /// simply passing through anything `next` doesn't know about.
    /// Entries of `next` that nothing in `self` renames into are carried over,
    /// with their original mapped back through our class names.
    /// A carried over entry never replaces an existing one.
    pub fn chain(&self, next: &Mappings) -> Result<Mappings, RenameError> {
        let mut builder = MappingsBuilder::default();
        for (original, renamed) in self.classes() {
            builder.insert_class(original.clone(), next.remap_class(renamed))?;
        }
        for (original, renamed) in self.fields() {
            builder.insert_field(original.clone(), next.remap_field(renamed))?;
        }
        for (original, renamed) in self.methods() {
            builder.insert_method(original.clone(), next.remap_method(renamed))?;
        }
        for (intermediate, renamed) in next.classes() {
            if !self.classes.contains_renamed(intermediate) {
                let original = self.unmap_class(intermediate);
                if !builder.classes.contains_original(&original) && !builder.classes.contains_renamed(renamed) {
                    builder.insert_class(original, renamed.clone())?;
                }
            }
        }
        for (intermediate, renamed) in next.fields() {
            if !self.fields.contains_renamed(intermediate) {
                let original = self.unmap_field(intermediate);
                if !builder.fields.contains_original(&original) && !builder.fields.contains_renamed(renamed) {
                    builder.insert_field(original, renamed.clone())?;
                }
            }
        }
        for (intermediate, renamed) in next.methods() {
            if !self.methods.contains_renamed(intermediate) {
                let original = self.unmap_method(intermediate);
                if !builder.methods.contains_original(&original) && !builder.methods.contains_renamed(renamed) {
                    builder.insert_method(original, renamed.clone())?;
                }
            }
        }
        Ok(builder.build())
    }
    /// Chain all the specified mappings together, in order
    pub fn chain_all<'a, I>(mappings: I) -> Result<Mappings, RenameError>
    where
        I: IntoIterator<Item = &'a Mappings>,
    {
        let mut result = Mappings::empty();
        for next in mappings {
            result = result.chain(next)?;
        }
        Ok(result)
    }
    /// Rename the renamed side of every entry using the specified functions.
    ///
    /// Only the names change: the originals are kept as-is,
    /// along with the declaring types and signatures of the renamed members.
    pub fn transform<C, M, F>(
        &self,
        mut rename_class: C,
        mut rename_method: M,
        mut rename_field: F,
    ) -> Result<Mappings, RenameError>
    where
        C: FnMut(&TypeName) -> TypeName,
        M: FnMut(&MethodData) -> String,
        F: FnMut(&FieldData) -> String,
    {
        let mut builder = MappingsBuilder::default();
        for (original, renamed) in self.classes() {
            builder.insert_class(original.clone(), rename_class(renamed))?;
        }
        for (original, renamed) in self.fields() {
            builder.insert_field(original.clone(), renamed.with_name(rename_field(renamed)))?;
        }
        for (original, renamed) in self.methods() {
            builder.insert_method(original.clone(), renamed.with_name(rename_method(renamed)))?;
        }
        Ok(builder.build())
    }
    /// Move renamed classes into different packages,
    /// updating every member and signature that references them.
    ///
    /// The function is given the internal name of a package,
    /// returning `None` to leave it unchanged.
    pub fn transform_packages<F>(&self, mut func: F) -> Result<Mappings, RenameError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut rename = |name: &TypeName| match func(name.package()) {
            Some(package) => name.with_package(&package),
            None => name.clone(),
        };
        let mut builder = MappingsBuilder::default();
        for (original, renamed) in self.classes() {
            builder.insert_class(original.clone(), rename(renamed))?;
        }
        for (original, renamed) in self.fields() {
            let declaring_type = rename(&renamed.declaring_type);
            builder.insert_field(original.clone(), FieldData::new(declaring_type, renamed.name.clone()))?;
        }
        for (original, renamed) in self.methods() {
            let declaring_type = rename(&renamed.declaring_type);
            let signature = renamed.signature.map_classes(|name| Some(rename(name)));
            builder.insert_method(
                original.clone(),
                MethodData::new(declaring_type, renamed.name.clone(), signature),
            )?;
        }
        Ok(builder.build())
    }
    /// Remove the entries that don't actually rename anything.
    ///
    /// Members are compared by name alone,
    /// since the rename of their declaring type is already implied by the class entry.
    pub fn strip_duplicates(&self) -> Mappings {
        let mut builder = self.rebuild();
        builder.retain_classes(|original, renamed| original != renamed);
        builder.retain_fields(|original, renamed| original.name != renamed.name);
        builder.retain_methods(|original, renamed| original.name != renamed.name);
        builder.build()
    }
    #[inline]
    pub fn rebuild(&self) -> MappingsBuilder {
        MappingsBuilder {
            classes: self.classes.clone(),
            fields: self.fields.clone(),
            methods: self.methods.clone(),
        }
    }
}

/// Incrementally builds a [`Mappings`], rejecting anything that would break bijectivity
#[derive(Clone, Debug, Default)]
pub struct MappingsBuilder {
    classes: InjectiveMap<TypeName>,
    fields: InjectiveMap<FieldData>,
    methods: InjectiveMap<MethodData>,
}
impl MappingsBuilder {
    #[inline]
    pub fn insert_class(&mut self, original: TypeName, renamed: TypeName) -> Result<(), RenameError> {
        self.classes.insert(original, renamed)
    }
    #[inline]
    pub fn insert_field(&mut self, original: FieldData, renamed: FieldData) -> Result<(), RenameError> {
        self.fields.insert(original, renamed)
    }
    #[inline]
    pub fn insert_method(&mut self, original: MethodData, renamed: MethodData) -> Result<(), RenameError> {
        self.methods.insert(original, renamed)
    }
    /// Rename a field in place, keeping the declaring type
    #[inline]
    pub fn set_field_name<S: Into<String>>(&mut self, original: FieldData, name: S) -> Result<(), RenameError> {
        let renamed = original.with_name(name);
        self.insert_field(original, renamed)
    }
    /// Rename a method in place, keeping the declaring type and signature
    #[inline]
    pub fn set_method_name<S: Into<String>>(&mut self, original: MethodData, name: S) -> Result<(), RenameError> {
        let renamed = original.with_name(name);
        self.insert_method(original, renamed)
    }
    #[inline]
    pub fn get_remapped_class(&self, original: &TypeName) -> Option<&TypeName> {
        self.classes.get(original)
    }
    #[inline]
    pub fn remap_class(&self, original: &TypeName) -> TypeName {
        self.classes.get(original).cloned().unwrap_or_else(|| original.clone())
    }
    #[inline]
    pub fn retain_classes<F: FnMut(&TypeName, &TypeName) -> bool>(&mut self, func: F) {
        self.classes.retain(func)
    }
    #[inline]
    pub fn retain_fields<F: FnMut(&FieldData, &FieldData) -> bool>(&mut self, func: F) {
        self.fields.retain(func)
    }
    #[inline]
    pub fn retain_methods<F: FnMut(&MethodData, &MethodData) -> bool>(&mut self, func: F) {
        self.methods.retain(func)
    }
    #[inline]
    pub fn clear_classes(&mut self) {
        self.classes.clear()
    }
    #[inline]
    pub fn clear_fields(&mut self) {
        self.fields.clear()
    }
    #[inline]
    pub fn clear_methods(&mut self) {
        self.methods.clear()
    }
    #[inline]
    pub fn build(self) -> Mappings {
        Mappings { classes: self.classes, fields: self.fields, methods: self.methods }
    }
}

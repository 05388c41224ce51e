//! Variant planning.
//!
//! Upload, delete and rollback all derive an asset's variants here, so the
//! keys written and the keys removed cannot drift apart.

use pictor_core::{
    AssetDescriptor, AssetFormat, AssetType, Classification, Customization, SizeSelection,
    SizeSpec, VariantDescriptor, VariantKind,
};
use pictor_storage::keys;

/// Catalog entries to produce, in catalog order.
///
/// Requested names not present in the catalog are dropped.
pub fn effective_sizes<'a>(
    catalog: &'a [SizeSpec],
    requested: Option<&[String]>,
    selection: SizeSelection,
) -> Vec<&'a SizeSpec> {
    match requested {
        Some(names) => catalog
            .iter()
            .filter(|size| names.iter().any(|name| name == &size.name))
            .collect(),
        None => match selection {
            SizeSelection::AllWhenUnspecified => catalog.iter().collect(),
            SizeSelection::NoneWhenUnspecified => Vec::new(),
        },
    }
}

/// Ordered variants for an asset: the untransformed variant first, then sizes.
pub fn plan_variants(
    descriptor: &AssetDescriptor,
    classification: Classification,
    catalog: &[SizeSpec],
    customization: &Customization,
    selection: SizeSelection,
) -> Vec<VariantDescriptor> {
    let custom = customization.upload_path.as_deref();
    let hash = descriptor.hash.as_str();
    let ext = descriptor.ext.as_str();

    let build = |kind: VariantKind, resize| {
        let path_fragment = keys::variant_path(kind.segment(), hash, ext);
        VariantDescriptor {
            storage_key: keys::resolve_key(custom, Some(&path_fragment), hash, ext),
            path_fragment,
            kind,
            mime: descriptor.mime.clone(),
            resize,
        }
    };

    match classification.format {
        AssetFormat::File | AssetFormat::Icon => vec![build(VariantKind::File, None)],
        AssetFormat::Image => {
            let mut variants = vec![build(VariantKind::Original, None)];
            if classification.asset_type == AssetType::Origin {
                let sizes = effective_sizes(
                    catalog,
                    customization.image_sizes.as_deref(),
                    selection,
                );
                variants.extend(sizes.into_iter().map(|size| {
                    build(
                        VariantKind::Size(size.name.clone()),
                        Some(size.resize_options.clone()),
                    )
                }));
            }
            variants
        }
    }
}

pub fn planned_keys(variants: &[VariantDescriptor]) -> Vec<String> {
    variants.iter().map(|v| v.storage_key.clone()).collect()
}

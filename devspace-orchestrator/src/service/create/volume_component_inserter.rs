use devspace_core::domain::devfile::{Component, Volume, VolumeMount};

use super::constants::WORKSPACE_DATA_VOLUME_SIZE;
use super::context::Prepared;

/// Adds the data volume and mounts it in every container component
pub fn insert(mut prepared: Prepared) -> Prepared {
    let name = prepared.volume.data_volume_name.clone();
    let path = prepared.volume.data_volume_mount_path.clone();
    let devfile = &mut prepared.processed_devfile;

    for container in devfile
        .components
        .iter_mut()
        .filter_map(|component| component.container.as_mut())
    {
        container.volume_mounts.push(VolumeMount {
            name: name.clone(),
            path: Some(path.clone()),
        });
    }

    devfile.components.push(Component {
        name,
        volume: Some(Volume {
            size: Some(WORKSPACE_DATA_VOLUME_SIZE.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    });

    prepared
}

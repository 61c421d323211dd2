use super::constants::{WORKSPACE_DATA_VOLUME_NAME, WORKSPACE_DATA_VOLUME_PATH, tools_dir};
use super::context::{Prepared, ProvisioningOptions, Validated, VolumeSettings};

/// Fixes the data volume layout the later mutators build on
pub fn define(validated: Validated, options: ProvisioningOptions) -> Prepared {
    let volume = VolumeSettings {
        data_volume_name: WORKSPACE_DATA_VOLUME_NAME.to_string(),
        data_volume_mount_path: WORKSPACE_DATA_VOLUME_PATH.to_string(),
        tools_dir: tools_dir(),
    };
    Prepared::new(validated, volume, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::create::test_support;

    #[test]
    fn test_volume_settings() {
        let prepared = define(test_support::validated(), test_support::options(false));

        assert_eq!(prepared.volume.data_volume_name, "gl-workspace-data");
        assert_eq!(prepared.volume.data_volume_mount_path, "/projects");
        assert_eq!(prepared.volume.tools_dir, "/projects/.gl-tools");
    }
}

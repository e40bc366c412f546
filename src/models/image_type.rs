use serde::{Deserialize, Serialize};

/// An output format the compose service can build.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageType {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ImageType {
    pub fn new(name: &str, label: &str, enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            enabled,
        }
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// Human readable labels for the image types known to the compose API.
pub fn default_label(name: &str) -> Option<&'static str> {
    let label = match name {
        "alibaba" => "Alibaba Cloud",
        "ami" => "Amazon Web Services (.raw)",
        "google" => "Google Cloud Platform",
        "hyper-v" => "Microsoft Hyper-V (.vhd)",
        "live-iso" => "Live ISO (.iso)",
        "liveimg-tar" => "Live image tarball (.tar)",
        "openstack" => "OpenStack (.qcow2)",
        "partitioned-disk" => "Disk image (.img)",
        "qcow2" => "QEMU QCOW2 (.qcow2)",
        "tar" => "Tarball (.tar)",
        "vhd" => "Microsoft Azure (.vhd)",
        "vmdk" => "VMware VSphere (.vmdk)",
        _ => return None,
    };
    Some(label)
}

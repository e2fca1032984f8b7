//! The builtin schema table.
//!
//! Message and enum definitions are built programmatically as
//! `prost_types` descriptor protos and resolved into a
//! [`DescriptorPool`], mirroring the checkpoint tool's static image
//! table. Everything in this file is data; the codecs never change when
//! a schema or format is added here.

use super::{magic, ImageFormat, Registry};
use crate::error::{Error, Result};
use prost_reflect::DescriptorPool;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet,
};

/// Builds a scalar field descriptor
pub(crate) fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

/// Builds an enum or message field descriptor referencing a named type
pub(crate) fn typed_field(
    name: &str,
    number: i32,
    label: Label,
    ty: Type,
    type_name: &str,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_owned()),
        ..field(name, number, label, ty)
    }
}

/// Builds a message descriptor from its fields
pub(crate) fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        ..Default::default()
    }
}

/// Builds an enum descriptor from name/number pairs
pub(crate) fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_owned()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).to_owned()),
                number: Some(*number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

/// Builds a proto2 file descriptor holding the given definitions
pub(crate) fn file(
    name: &str,
    package: &str,
    messages: Vec<DescriptorProto>,
    enums: Vec<EnumDescriptorProto>,
) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_owned()),
        package: Some(package.to_owned()),
        message_type: messages,
        enum_type: enums,
        syntax: Some("proto2".to_owned()),
        ..Default::default()
    }
}

/// Resolves a single file descriptor into a pool
pub(crate) fn pool_from(file: FileDescriptorProto) -> Result<DescriptorPool> {
    Ok(DescriptorPool::from_file_descriptor_set(
        FileDescriptorSet { file: vec![file] },
    )?)
}

/// The builtin message and enum definitions
fn images_file() -> FileDescriptorProto {
    use Label::{Optional, Repeated, Required};

    let fd_types = enumeration(
        "FdTypes",
        &[
            ("UND", 0),
            ("REG", 1),
            ("PIPE", 2),
            ("FIFO", 3),
            ("INETSK", 4),
            ("UNIXSK", 5),
            ("EVENTFD", 6),
            ("TTY", 7),
        ],
    );

    let task_kobj_ids = message(
        "TaskKobjIdsEntry",
        vec![
            field("vm_id", 1, Required, Type::Uint32),
            field("files_id", 2, Required, Type::Uint32),
            field("fs_id", 3, Required, Type::Uint32),
            field("sighand_id", 4, Required, Type::Uint32),
        ],
    );

    let inventory = message(
        "InventoryEntry",
        vec![
            field("img_version", 1, Required, Type::Uint32),
            field("fdinfo_per_id", 2, Optional, Type::Bool),
            typed_field(
                "root_ids",
                3,
                Optional,
                Type::Message,
                ".criu.TaskKobjIdsEntry",
            ),
            field("ns_per_id", 4, Optional, Type::Bool),
            field("root_cg_set", 5, Optional, Type::Uint32),
            field("pre_dumped", 6, Optional, Type::Bool),
        ],
    );

    let utsns = message(
        "UtsnsEntry",
        vec![
            field("nodename", 1, Required, Type::String),
            field("domainname", 2, Required, Type::String),
        ],
    );

    let ghost_file = message(
        "GhostFileEntry",
        vec![
            field("uid", 1, Required, Type::Uint32),
            field("gid", 2, Required, Type::Uint32),
            field("mode", 3, Required, Type::Uint32),
            field("dev", 4, Optional, Type::Uint32),
            field("ino", 5, Optional, Type::Uint64),
        ],
    );

    let pstree = message(
        "PstreeEntry",
        vec![
            field("pid", 1, Required, Type::Uint32),
            field("ppid", 2, Required, Type::Uint32),
            field("pgid", 3, Required, Type::Uint32),
            field("sid", 4, Required, Type::Uint32),
            field("threads", 5, Repeated, Type::Uint32),
        ],
    );

    let fown = message(
        "FownEntry",
        vec![
            field("uid", 1, Required, Type::Uint32),
            field("euid", 2, Required, Type::Uint32),
            field("signum", 3, Required, Type::Uint32),
            field("pid_type", 4, Required, Type::Uint32),
            field("pid", 5, Required, Type::Uint32),
        ],
    );

    let reg_file = message(
        "RegFileEntry",
        vec![
            field("id", 1, Required, Type::Uint32),
            field("flags", 2, Required, Type::Uint32),
            field("pos", 3, Required, Type::Uint64),
            typed_field("fown", 5, Required, Type::Message, ".criu.FownEntry"),
            field("name", 6, Required, Type::String),
            field("mnt_id", 7, Optional, Type::Int32),
            field("size", 8, Optional, Type::Uint64),
        ],
    );

    let fdinfo = message(
        "FdinfoEntry",
        vec![
            field("id", 1, Required, Type::Uint32),
            field("flags", 2, Required, Type::Uint32),
            typed_field("type", 3, Required, Type::Enum, ".criu.FdTypes"),
            field("fd", 4, Required, Type::Uint32),
        ],
    );

    let pipe_data = message(
        "PipeDataEntry",
        vec![
            field("pipe_id", 1, Required, Type::Uint32),
            field("bytes", 2, Required, Type::Uint32),
            field("data", 3, Optional, Type::Bytes),
        ],
    );

    let pagemap_head = message(
        "PagemapHead",
        vec![field("pages_id", 1, Required, Type::Uint32)],
    );

    let pagemap_entry = message(
        "PagemapEntry",
        vec![
            field("vaddr", 1, Required, Type::Uint64),
            field("nr_pages", 2, Required, Type::Uint32),
            field("flags", 3, Optional, Type::Uint32),
        ],
    );

    file(
        "criu/images.proto",
        "criu",
        vec![
            task_kobj_ids,
            inventory,
            utsns,
            ghost_file,
            pstree,
            fown,
            reg_file,
            fdinfo,
            pipe_data,
            pagemap_head,
            pagemap_entry,
        ],
        vec![fd_types],
    )
}

/// Builds the builtin registry
pub(crate) fn builtin() -> Result<Registry> {
    let pool = pool_from(images_file())?;
    let schema = |name: &str| {
        pool.get_message_by_name(name)
            .ok_or_else(|| Error::internal(format!("missing builtin schema '{name}'")))
    };

    Ok(Registry::new(vec![
        ImageFormat::single(magic::INVENTORY, schema("criu.InventoryEntry")?),
        ImageFormat::single(magic::IDS, schema("criu.TaskKobjIdsEntry")?),
        ImageFormat::single(magic::UTSNS, schema("criu.UtsnsEntry")?),
        ImageFormat::single(magic::GHOST_FILE, schema("criu.GhostFileEntry")?),
        ImageFormat::array(magic::PSTREE, schema("criu.PstreeEntry")?),
        ImageFormat::array(magic::REG_FILES, schema("criu.RegFileEntry")?),
        ImageFormat::array(magic::FDINFO, schema("criu.FdinfoEntry")?),
        ImageFormat::array(magic::PIPES_DATA, schema("criu.PipeDataEntry")?),
        ImageFormat::array_with_header(
            magic::PAGEMAP,
            schema("criu.PagemapHead")?,
            schema("criu.PagemapEntry")?,
        ),
    ]))
}

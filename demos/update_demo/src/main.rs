// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edit/evaluate cycles over a small scene, with the dependency walk traced.
//!
//! Builds a camera, a material, two meshes (one instancing the other) and a
//! scene variables object, then runs several edit/evaluate cycles. Each pass
//! is printed by a [`PrettyPrintSink`](accretion_debug::pretty::PrettyPrintSink)
//! and recorded by a [`RecorderSink`](accretion_debug::recorder::RecorderSink);
//! the recording is exported as a Chrome trace JSON file. Finally the
//! viewports are resolved and a framebuffer is sized from the region window.

use std::fs::File;
use std::io::BufWriter;

use accretion_core::attribute::{AttributeFlags, Interface, ObjectVector};
use accretion_core::geometry::{Geometry, GeometryKeys};
use accretion_core::object::{AttributeTreePrep, ObjectId, ObjectStore};
use accretion_core::scene_variables::SceneVariablesKeys;
use accretion_core::trace::{
    CycleEvent, MemoHitEvent, ObjectResolvedEvent, ObjectVisitEvent, PrepEvent, TraceSink,
    Tracer, UpdateBeginEvent, UpdateSummary,
};
use accretion_core::viewport::Viewport;
use accretion_debug::pretty::PrettyPrintSink;
use accretion_debug::recorder::RecorderSink;
use accretion_fb::{Fb, RenderColor};

/// Forwards every event to both sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_update_begin(&mut self, e: &UpdateBeginEvent) {
        self.pretty.on_update_begin(e);
        self.recorder.on_update_begin(e);
    }

    fn on_object_visit(&mut self, e: &ObjectVisitEvent) {
        self.pretty.on_object_visit(e);
        self.recorder.on_object_visit(e);
    }

    fn on_object_resolved(&mut self, e: &ObjectResolvedEvent) {
        self.pretty.on_object_resolved(e);
        self.recorder.on_object_resolved(e);
    }

    fn on_memo_hit(&mut self, e: &MemoHitEvent) {
        self.pretty.on_memo_hit(e);
        self.recorder.on_memo_hit(e);
    }

    fn on_cycle(&mut self, e: &CycleEvent) {
        self.pretty.on_cycle(e);
        self.recorder.on_cycle(e);
    }

    fn on_prep(&mut self, e: &PrepEvent) {
        self.pretty.on_prep(e);
        self.recorder.on_prep(e);
    }

    fn on_update_summary(&mut self, s: &UpdateSummary) {
        self.pretty.on_update_summary(s);
        self.recorder.on_update_summary(s);
    }

    fn on_stale_objects(&mut self, epoch: u64, objects: &[u32]) {
        self.pretty.on_stale_objects(epoch, objects);
        self.recorder.on_stale_objects(epoch, objects);
    }
}

fn main() {
    // -- classes -----------------------------------------------------------
    let mut store = ObjectStore::new();
    let (geometry, geom) = Geometry::register(&mut store);
    let (mesh, mesh_material) =
        store.register_class("Mesh", Some(geometry), Interface::GEOMETRY, |b| {
            b.declare_with(
                "material",
                None,
                AttributeFlags::CAN_SKIP_GEOM_RELOAD,
                Interface::MATERIAL,
            )
        });
    let (material, roughness) =
        store.register_class("Material", None, Interface::MATERIAL, |b| {
            b.declare("roughness", 0.5_f32)
        });
    let (camera, focal) = store.register_class("Camera", None, Interface::CAMERA, |b| {
        b.declare("focal", 30.0_f32)
    });
    let (vars_class, vars) = SceneVariablesKeys::register(&mut store);

    // -- scene -------------------------------------------------------------
    let cam = store.create_object(camera, "/cam");
    let shiny = store.create_object(material, "/shiny");
    let teapot = store.create_object(mesh, "/teapot");
    let instancer = store.create_object(mesh, "/instancer");
    let sv = store.create_object(vars_class, "__SceneVariables__");

    store
        .set(teapot, geom.dicing_camera, Some(cam))
        .expect("camera implements the camera interface");
    store
        .set(teapot, mesh_material, Some(shiny))
        .expect("material implements the material interface");
    store
        .set(instancer, geom.references, ObjectVector(vec![teapot]))
        .expect("teapot is geometry");

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();
    pretty.label_objects(&store);

    // -- cycles ------------------------------------------------------------
    println!("== cycle 1: everything is new");
    evaluate(&mut store, &geom, &mut pretty, &mut recorder);

    println!("== cycle 2: the camera moves");
    store.set(cam, focal, 50.0).expect("plain float");
    evaluate(&mut store, &geom, &mut pretty, &mut recorder);

    println!("== cycle 3: material-only edit");
    store.set(shiny, roughness, 0.1).expect("plain float");
    evaluate(&mut store, &geom, &mut pretty, &mut recorder);

    println!("== cycle 4: epsilon tweak, nothing to regenerate");
    store.set(teapot, geom.ray_epsilon, 0.01).expect("plain float");
    evaluate(&mut store, &geom, &mut pretty, &mut recorder);

    println!("== cycle 5: teapot hidden from shadows");
    store
        .set(teapot, geom.visible_shadow, false)
        .expect("plain bool");
    evaluate(&mut store, &geom, &mut pretty, &mut recorder);
    println!(
        "teapot mask={:#05x} instancer mask={:#05x}",
        geom.visibility_mask(&store, teapot).bits(),
        geom.visibility_mask(&store, instancer).bits(),
    );

    // -- viewports ---------------------------------------------------------
    store.set(sv, vars.res, 2.0).expect("plain float");
    vars.set_window(
        &mut store,
        sv,
        vars.region_window,
        Some(Viewport::new(0, 0, 960, 540)),
    )
    .expect("window");
    vars.set_window(
        &mut store,
        sv,
        vars.sub_viewport,
        Some(Viewport::new(100, 100, 400, 300)),
    )
    .expect("window");

    let view = vars.view(&store, sv);
    println!("inv_res={}", view.inv_res());
    println!("aperture={:?}", view.rezed_aperture_window());
    println!("region={:?}", view.rezed_region_window());
    println!("sub_viewport={:?}", view.rezed_sub_viewport());
    println!(
        "camera={:?} machine={}/{}",
        view.camera().map(|c| store.name(c)),
        view.machine_id(),
        view.num_machines(),
    );

    vars.set_debug_pixel(&mut store, sv, Some((20, 30)))
        .expect("pair");
    let view = vars.view(&store, sv);
    println!("sub_viewport with debug pixel={:?}", view.rezed_sub_viewport());

    // -- framebuffer -------------------------------------------------------
    let region = view.rezed_region_window().value;
    let mut fb = Fb::from_viewport(region);
    fb.set_pix_render_buffer(20, 30, RenderColor::new(1.0, 0.5, 0.25, 1.0));
    println!(
        "fb {}x{} pixel(20, 30)={:?}",
        fb.width(),
        fb.height(),
        fb.pix_render_buffer(20, 30),
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    accretion_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path}");
}

/// Runs one update pass over every geometry, then ends the cycle.
fn evaluate(
    store: &mut ObjectStore,
    geom: &GeometryKeys,
    pretty: &mut PrettyPrintSink,
    recorder: &mut RecorderSink,
) {
    let begin = store.begin_update();
    let mut tee = Tee { pretty, recorder };
    let mut tracer = Tracer::new(&mut tee);
    tracer.update_begin(&begin);

    let geometries: Vec<ObjectId> = store.objects_with_interface(Interface::GEOMETRY).collect();
    for id in geometries {
        let stale = store.requires_update(id, &mut AttributeTreePrep, &mut tracer);
        println!(
            "  {} stale={stale} side={:?}",
            store.name(id),
            geom.side_type(store, id),
        );
    }
    store.finish_update(&mut tracer);
    store.commit_changes();
}

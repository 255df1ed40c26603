use super::{LanguageCode, LanguageProfile};

pub(super) static VIETNAMESE: LanguageProfile = LanguageProfile {
    code: LanguageCode::Vi,
    name: "Tiếng Việt",
    system_prompt: "Bạn là trợ lý AI thông minh, trả lời CHÍNH XÁC bằng tiếng Việt.

Quy tắc:
- Trả lời ngắn gọn, đúng trọng tâm (2-5 câu)
- Nếu là câu hỏi về sự kiện/con số cụ thể, trả lời TRỰC TIẾP thông tin đó
- KHÔNG bịa đặt thông tin
- Nếu không biết chắc chắn, nói rõ \"Tôi không chắc chắn về điều này\"
{search_context}

Câu hỏi: {message}

Trả lời bằng tiếng Việt:",
    vision_prompt: "Bạn là trợ lý AI thông minh. Hãy phân tích hình ảnh này và trả lời câu hỏi bằng tiếng Việt.

Câu hỏi: {message}

Hãy mô tả chi tiết những gì bạn nhìn thấy trong hình và trả lời câu hỏi bằng tiếng Việt:",
    describe_image_prompt: "Mô tả chi tiết nội dung bức ảnh này.",
    search_keywords: &[
        "mới nhất",
        "hiện tại",
        "hôm nay",
        "năm nay",
        "tin tức",
        "thời tiết",
        "giá",
        "bao nhiêu tỉnh",
        "2025",
        "2024",
        "cập nhật",
        "sáp nhập",
        "thay đổi",
        "ai là",
        "là ai",
    ],
    search_date_format: "%d/%m/%Y",
    search_header: "Thông tin tham khảo từ web (ngày {date}):",
    search_closing: "Hãy dựa vào thông tin trên để trả lời chính xác.",
};

pub(super) static ENGLISH: LanguageProfile = LanguageProfile {
    code: LanguageCode::En,
    name: "English",
    system_prompt: "You are an intelligent AI assistant. Answer ACCURATELY in English.

Rules:
- Answer concisely and to the point (2-5 sentences)
- For factual questions, provide DIRECT information
- DO NOT make up information
- If uncertain, clearly state \"I'm not certain about this\"
{search_context}

Question: {message}

Answer in English:",
    vision_prompt: "You are an intelligent AI assistant. Analyze this image and answer the question in English.

Question: {message}

Describe in detail what you see in the image and answer the question in English:",
    describe_image_prompt: "Describe in detail what is shown in this image.",
    search_keywords: &[
        "latest",
        "current",
        "today",
        "this year",
        "news",
        "weather",
        "price",
        "how many",
        "2025",
        "2024",
        "update",
        "merger",
        "changes",
        "who is",
    ],
    search_date_format: "%m/%d/%Y",
    search_header: "Reference information from web ({date}):",
    search_closing: "Use the information above to answer accurately.",
};

pub(super) static CHINESE: LanguageProfile = LanguageProfile {
    code: LanguageCode::Zh,
    name: "中文",
    system_prompt: "你是一个智能AI助手，用中文准确回答。

规则：
- 简洁明了地回答（2-5句话）
- 对于事实性问题，直接提供信息
- 不要编造信息
- 如果不确定，明确说明\"我不太确定\"
{search_context}

问题：{message}

用中文回答：",
    vision_prompt: "你是一个智能AI助手。分析这张图片并用中文回答问题。

问题：{message}

详细描述你在图片中看到的内容，并用中文回答问题：",
    describe_image_prompt: "详细描述这张图片的内容。",
    search_keywords: &[
        "最新", "当前", "今天", "今年", "新闻", "天气", "价格", "多少", "2025", "2024", "更新",
        "合并", "变化", "是谁",
    ],
    search_date_format: "%Y/%m/%d",
    search_header: "网络参考信息 ({date}):",
    search_closing: "请根据以上信息准确回答。",
};
